//! Slot storage backing a handle table.
//!
//! Entries live in a contiguous growable `Vec`; free slots form an
//! intrusive singly linked list threaded through the vector, head first.
//! Freeing a slot drops its value immediately, so a stale index can never
//! observe old entry data.

use tracing::debug;

/// One fixed-size storage unit. The free-list link is only meaningful
/// while the slot is free.
#[derive(Debug)]
pub(crate) enum Slot<T> {
    Free { next: Option<u32> },
    Allocated(T),
}

/// Growable pool of slots with LIFO free-slot reuse.
#[derive(Debug)]
pub(crate) struct SlotStore<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<u32>,
    allocated: usize,
}

impl<T> SlotStore<T> {
    /// Create a store with `initial` slots, all free, linked in ascending
    /// index order so the first allocation yields index 0.
    pub(crate) fn with_capacity(initial: usize) -> Self {
        let mut store = SlotStore {
            slots: Vec::new(),
            free_head: None,
            allocated: 0,
        };
        if initial > 0 {
            store.extend_free(initial);
        }
        store
    }

    /// Total number of slots, free and allocated.
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of currently allocated slots.
    pub(crate) fn allocated(&self) -> usize {
        self.allocated
    }

    /// Store `value` in a free slot, growing the pool if none is left.
    /// Returns the slot index and a reference to the stored value.
    pub(crate) fn alloc(&mut self, value: T) -> (u32, &mut T) {
        let index = match self.free_head {
            Some(index) => index,
            None => self.grow(),
        };

        let slot = &mut self.slots[index as usize];
        match std::mem::replace(slot, Slot::Allocated(value)) {
            Slot::Free { next } => self.free_head = next,
            Slot::Allocated(_) => unreachable!("allocated slot on the free list"),
        }
        self.allocated += 1;

        match &mut self.slots[index as usize] {
            Slot::Allocated(entry) => (index, entry),
            Slot::Free { .. } => unreachable!("slot was just allocated"),
        }
    }

    /// Return a slot to the free list, dropping out its value.
    ///
    /// Returns `None` when the index is out of range or the slot is
    /// already free.
    pub(crate) fn free(&mut self, index: u32) -> Option<T> {
        let slot = self.slots.get_mut(index as usize)?;
        if matches!(slot, Slot::Free { .. }) {
            return None;
        }

        let freed = std::mem::replace(
            slot,
            Slot::Free {
                next: self.free_head,
            },
        );
        self.free_head = Some(index);
        self.allocated -= 1;

        match freed {
            Slot::Allocated(value) => Some(value),
            Slot::Free { .. } => unreachable!("checked allocated above"),
        }
    }

    pub(crate) fn get(&self, index: u32) -> Option<&T> {
        match self.slots.get(index as usize)? {
            Slot::Allocated(entry) => Some(entry),
            Slot::Free { .. } => None,
        }
    }

    pub(crate) fn get_mut(&mut self, index: u32) -> Option<&mut T> {
        match self.slots.get_mut(index as usize)? {
            Slot::Allocated(entry) => Some(entry),
            Slot::Free { .. } => None,
        }
    }

    /// Lowest allocated index at or after `start`, if any. Drives the
    /// walker's ascending scan.
    pub(crate) fn next_allocated(&self, start: u32) -> Option<u32> {
        let start = start as usize;
        if start >= self.slots.len() {
            return None;
        }
        self.slots[start..]
            .iter()
            .position(|slot| matches!(slot, Slot::Allocated(_)))
            .map(|offset| (start + offset) as u32)
    }

    /// Double capacity (at least one slot) and return the new free-list
    /// head. Called only when the free list is empty.
    fn grow(&mut self) -> u32 {
        let additional = self.slots.len().max(1);
        let head = self.extend_free(additional);
        debug!(
            capacity = self.slots.len(),
            added = additional,
            "grew slot storage"
        );
        head
    }

    /// Append `additional` free slots, linking them onto the free list in
    /// ascending index order. Returns the index of the first new slot.
    fn extend_free(&mut self, additional: usize) -> u32 {
        let first = self.slots.len();
        let last = first + additional - 1;
        assert!(
            first + additional <= u32::MAX as usize,
            "slot index space exhausted"
        );

        self.slots.reserve(additional);
        for index in first..last {
            self.slots.push(Slot::Free {
                next: Some(index as u32 + 1),
            });
        }
        self.slots.push(Slot::Free {
            next: self.free_head,
        });
        self.free_head = Some(first as u32);
        first as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_slots_allocate_in_index_order() {
        let mut store: SlotStore<u8> = SlotStore::with_capacity(3);
        assert_eq!(store.capacity(), 3);
        assert_eq!(store.alloc(10).0, 0);
        assert_eq!(store.alloc(11).0, 1);
        assert_eq!(store.alloc(12).0, 2);
        assert_eq!(store.allocated(), 3);
    }

    #[test]
    fn test_freed_slot_is_reused_first() {
        let mut store: SlotStore<u8> = SlotStore::with_capacity(4);
        store.alloc(0);
        store.alloc(1);
        store.alloc(2);

        assert_eq!(store.free(1), Some(1));
        assert_eq!(store.allocated(), 2);

        // LIFO reuse: index 1 comes back before untouched index 3.
        assert_eq!(store.alloc(9).0, 1);
        assert_eq!(store.alloc(9).0, 3);
    }

    #[test]
    fn test_double_free_returns_none() {
        let mut store: SlotStore<u8> = SlotStore::with_capacity(2);
        store.alloc(7);
        assert_eq!(store.free(0), Some(7));
        assert_eq!(store.free(0), None);
        assert_eq!(store.free(99), None);
    }

    #[test]
    fn test_growth_doubles_capacity() {
        let mut store: SlotStore<u8> = SlotStore::with_capacity(2);
        store.alloc(0);
        store.alloc(1);

        // Free list is empty; this allocation grows 2 -> 4.
        assert_eq!(store.alloc(2).0, 2);
        assert_eq!(store.capacity(), 4);
        assert_eq!(store.alloc(3).0, 3);

        // 4 -> 8.
        assert_eq!(store.alloc(4).0, 4);
        assert_eq!(store.capacity(), 8);
    }

    #[test]
    fn test_zero_capacity_grows_on_first_alloc() {
        let mut store: SlotStore<u8> = SlotStore::with_capacity(0);
        assert_eq!(store.capacity(), 0);
        assert_eq!(store.alloc(5).0, 0);
        assert_eq!(store.capacity(), 1);
    }

    #[test]
    fn test_freed_value_is_dropped_out() {
        let mut store: SlotStore<String> = SlotStore::with_capacity(1);
        store.alloc("live".to_string());
        assert_eq!(store.free(0), Some("live".to_string()));

        // The slot holds no value until reallocated.
        assert!(store.get(0).is_none());
        let (index, entry) = store.alloc("fresh".to_string());
        assert_eq!(index, 0);
        assert_eq!(entry, "fresh");
    }

    #[test]
    fn test_next_allocated_scans_ascending() {
        let mut store: SlotStore<u8> = SlotStore::with_capacity(4);
        store.alloc(0);
        store.alloc(1);
        store.alloc(2);
        store.free(1);

        assert_eq!(store.next_allocated(0), Some(0));
        assert_eq!(store.next_allocated(1), Some(2));
        assert_eq!(store.next_allocated(3), None);
        assert_eq!(store.next_allocated(100), None);
    }
}

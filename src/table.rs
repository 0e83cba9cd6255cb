//! Handle table: named slot pools for one resource class.

use crate::codec;
use crate::error::{HandleError, Result};
use crate::slots::SlotStore;
use serde::Serialize;
use tracing::{debug, info};

/// A pool of entries of type `T`, addressed by opaque textual handles.
///
/// The prefix identifies the resource class (`"fh"`, `"sock"`, ...) and
/// must be unique among simultaneously live tables that are meant to be
/// distinguishable: a handle is only valid against the table that issued
/// it, and translation against any other table fails with `WrongTable`.
///
/// Entry references returned by [`alloc`](HandleTable::alloc) and
/// [`translate`](HandleTable::translate) are scoped borrows; holders of a
/// handle string re-derive the entry through `translate` instead of
/// caching references across allocations.
#[derive(Debug)]
pub struct HandleTable<T> {
    prefix: String,
    store: SlotStore<T>,
}

/// Occupancy snapshot of one table, serializable for host-side
/// diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableStats {
    pub prefix: String,
    pub capacity: usize,
    pub allocated: usize,
    pub free: usize,
}

impl<T> HandleTable<T> {
    /// Create a table issuing handles `<prefix><index>`, with storage for
    /// `initial_capacity` entries up front.
    ///
    /// # Panics
    /// Panics if `prefix` is empty; an empty prefix would make foreign
    /// handles indistinguishable from this table's own.
    pub fn new(prefix: impl Into<String>, initial_capacity: usize) -> Self {
        let prefix = prefix.into();
        assert!(!prefix.is_empty(), "table prefix must not be empty");

        info!(
            prefix = %prefix,
            capacity = initial_capacity,
            "initializing handle table"
        );
        HandleTable {
            prefix,
            store: SlotStore::with_capacity(initial_capacity),
        }
    }

    /// The resource-class prefix this table stamps on its handles.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Number of currently allocated entries.
    pub fn len(&self) -> usize {
        self.store.allocated()
    }

    pub fn is_empty(&self) -> bool {
        self.store.allocated() == 0
    }

    /// Total slot count, free and allocated.
    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    /// Reserve a slot for `value`, growing storage when the free list is
    /// empty. Returns the entry's handle and a reference for any further
    /// initialization.
    ///
    /// Storage exhaustion aborts through the global allocator; it is
    /// never reported as an error value.
    pub fn alloc(&mut self, value: T) -> (String, &mut T) {
        let (index, entry) = self.store.alloc(value);
        let handle = codec::format_handle(&self.prefix, index);
        debug!(handle = %handle, "allocated entry");
        (handle, entry)
    }

    /// Validate `handle` and return its slot to the free list, handing the
    /// stored value back to the caller. A handle freed twice fails with
    /// `Stale` on the second call.
    pub fn free(&mut self, handle: &str) -> Result<T> {
        let index = self.checked_index(handle)?;
        let value = self
            .store
            .free(index)
            .ok_or_else(|| HandleError::Stale {
                handle: handle.to_string(),
                prefix: self.prefix.clone(),
            })?;
        debug!(handle = %handle, "freed entry");
        Ok(value)
    }

    /// Translate a handle back to its entry.
    ///
    /// The full validation ladder runs on every call: wrong prefix →
    /// `WrongTable`, non-numeric index → `Format`, index past capacity →
    /// `Range`, free slot → `Stale`. Translation never partially
    /// succeeds.
    pub fn translate(&self, handle: &str) -> Result<&T> {
        let index = self.checked_index(handle)?;
        self.store.get(index).ok_or_else(|| HandleError::Stale {
            handle: handle.to_string(),
            prefix: self.prefix.clone(),
        })
    }

    /// Mutable flavor of [`translate`](HandleTable::translate).
    pub fn translate_mut(&mut self, handle: &str) -> Result<&mut T> {
        let index = self.checked_index(handle)?;
        self.store.get_mut(index).ok_or_else(|| HandleError::Stale {
            handle: handle.to_string(),
            prefix: self.prefix.clone(),
        })
    }

    /// Whether `handle` currently names an allocated entry of this table.
    pub fn contains(&self, handle: &str) -> bool {
        self.translate(handle).is_ok()
    }

    /// Occupancy counters for diagnostics.
    pub fn stats(&self) -> TableStats {
        TableStats {
            prefix: self.prefix.clone(),
            capacity: self.store.capacity(),
            allocated: self.store.allocated(),
            free: self.store.capacity() - self.store.allocated(),
        }
    }

    pub(crate) fn store(&self) -> &SlotStore<T> {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut SlotStore<T> {
        &mut self.store
    }

    /// Parse the handle and bounds-check the index. Staleness is left to
    /// the caller's slot lookup.
    fn checked_index(&self, handle: &str) -> Result<u32> {
        let index = codec::parse_handle(&self.prefix, handle)?;
        if index as usize >= self.store.capacity() {
            return Err(HandleError::Range {
                handle: handle.to_string(),
                prefix: self.prefix.clone(),
                capacity: self.store.capacity(),
            });
        }
        Ok(index)
    }
}

impl<T> Drop for HandleTable<T> {
    fn drop(&mut self) {
        debug!(
            prefix = %self.prefix,
            allocated = self.store.allocated(),
            "releasing handle table"
        );
    }
}

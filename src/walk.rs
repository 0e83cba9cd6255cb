//! Live iteration over a table's allocated entries.
//!
//! A [`WalkCursor`] lives outside the table it walks, so the table stays
//! free for allocation and freeing between steps. The walk is a live view,
//! not a snapshot: entries allocated at or past the cursor are picked up,
//! entries freed before the cursor reaches them are skipped, and entries
//! already visited are unaffected by later frees.

use crate::codec;
use crate::table::HandleTable;

/// Progress marker over a table's slot indices, ascending.
///
/// `Default` is the before-first sentinel; [`reset`](WalkCursor::reset)
/// restarts a walk from the top.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkCursor {
    last: Option<u32>,
}

impl WalkCursor {
    /// A cursor positioned before the first slot.
    pub fn new() -> Self {
        WalkCursor::default()
    }

    /// Rewind to the before-first sentinel.
    pub fn reset(&mut self) {
        self.last = None;
    }

    fn next_start(&self) -> u32 {
        match self.last {
            Some(index) => index + 1,
            None => 0,
        }
    }
}

impl<T> HandleTable<T> {
    /// Advance `cursor` to the next allocated slot and return its entry,
    /// or `None` once no allocated slot remains at or past the cursor.
    pub fn walk_next<'t>(&'t self, cursor: &mut WalkCursor) -> Option<&'t T> {
        let index = self.store().next_allocated(cursor.next_start())?;
        cursor.last = Some(index);
        self.store().get(index)
    }

    /// Mutable flavor of [`walk_next`](HandleTable::walk_next), for walks
    /// that update the entries they visit.
    pub fn walk_next_mut<'t>(&'t mut self, cursor: &mut WalkCursor) -> Option<&'t mut T> {
        let index = self.store().next_allocated(cursor.next_start())?;
        cursor.last = Some(index);
        self.store_mut().get_mut(index)
    }

    /// Reconstruct the handle of the slot most recently returned by a walk
    /// step, without going through the entry. `None` before the first
    /// step.
    pub fn cursor_handle(&self, cursor: &WalkCursor) -> Option<String> {
        cursor
            .last
            .map(|index| codec::format_handle(self.prefix(), index))
    }

    /// Iterator over `(handle, entry)` pairs of all allocated slots,
    /// ascending. Convenience wrapper over a fresh cursor.
    pub fn entries(&self) -> Entries<'_, T> {
        Entries {
            table: self,
            cursor: WalkCursor::new(),
        }
    }
}

/// Iterator form of the walk, borrowing the table for its whole run.
#[derive(Debug)]
pub struct Entries<'t, T> {
    table: &'t HandleTable<T>,
    cursor: WalkCursor,
}

impl<'t, T> Iterator for Entries<'t, T> {
    type Item = (String, &'t T);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.table.walk_next(&mut self.cursor)?;
        let handle = self.table.cursor_handle(&self.cursor)?;
        Some((handle, entry))
    }
}

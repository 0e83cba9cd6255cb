//! Shared ownership of one handle table by several independent owners.
//!
//! The original use-count discipline (bump on acquire, drop on release,
//! free storage when the count hits zero) is carried by `Rc`: cloning a
//! [`SharedTable`] acquires, dropping releases, and the table's storage is
//! freed exactly once, when the last owner detaches. Operating on a
//! released table is unrepresentable, since release is a move.
//!
//! Tables are single-threaded; reentrant borrows through `RefCell` are
//! logic errors and panic rather than surfacing as recoverable errors.

use crate::error::Result;
use crate::table::HandleTable;
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;
use tracing::debug;

/// A reference-counted owner of a [`HandleTable`].
#[derive(Debug)]
pub struct SharedTable<T> {
    inner: Rc<RefCell<HandleTable<T>>>,
}

impl<T> SharedTable<T> {
    /// Create a shared table; the use count starts at 1.
    pub fn new(prefix: impl Into<String>, initial_capacity: usize) -> Self {
        SharedTable::from_table(HandleTable::new(prefix, initial_capacity))
    }

    /// Take shared ownership of an existing table.
    pub fn from_table(table: HandleTable<T>) -> Self {
        SharedTable {
            inner: Rc::new(RefCell::new(table)),
        }
    }

    /// Number of owners currently attached.
    pub fn use_count(&self) -> usize {
        Rc::strong_count(&self.inner)
    }

    /// Borrow the table for reading.
    pub fn table(&self) -> Ref<'_, HandleTable<T>> {
        self.inner.borrow()
    }

    /// Borrow the table for mutation.
    pub fn table_mut(&self) -> RefMut<'_, HandleTable<T>> {
        self.inner.borrow_mut()
    }

    /// Allocate an entry and return its handle.
    pub fn alloc(&self, value: T) -> String {
        let (handle, _) = self.inner.borrow_mut().alloc(value);
        handle
    }

    /// Validate `handle` and free its entry, handing the value back.
    pub fn free(&self, handle: &str) -> Result<T> {
        self.inner.borrow_mut().free(handle)
    }

    /// Translate `handle` and run `f` on the entry, scoping the borrow to
    /// the closure.
    pub fn with_entry<R>(&self, handle: &str, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        let mut table = self.inner.borrow_mut();
        let entry = table.translate_mut(handle)?;
        Ok(f(entry))
    }
}

impl<T> Clone for SharedTable<T> {
    /// Attach another owner; bumps the use count. Safe to call while a
    /// borrow of the table is live, e.g. from inside
    /// [`with_entry`](SharedTable::with_entry).
    fn clone(&self) -> Self {
        let inner = Rc::clone(&self.inner);
        debug!(use_count = Rc::strong_count(&inner), "attached table owner");
        SharedTable { inner }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandleError;

    #[test]
    fn test_use_count_follows_owners() {
        let table: SharedTable<u8> = SharedTable::new("sh", 2);
        assert_eq!(table.use_count(), 1);

        let second = table.clone();
        let third = second.clone();
        assert_eq!(table.use_count(), 3);

        drop(second);
        assert_eq!(table.use_count(), 2);
        drop(third);
        assert_eq!(table.use_count(), 1);
    }

    #[test]
    fn test_entries_visible_to_all_owners() -> Result<()> {
        let first: SharedTable<String> = SharedTable::new("sh", 2);
        let second = first.clone();

        let handle = first.alloc("shared".to_string());
        assert_eq!(second.table().translate(&handle)?, "shared");

        second.free(&handle)?;
        assert!(matches!(
            first.table().translate(&handle),
            Err(HandleError::Stale { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_with_entry_scopes_the_borrow() -> Result<()> {
        let table: SharedTable<Vec<u8>> = SharedTable::new("sh", 1);
        let handle = table.alloc(Vec::new());

        table.with_entry(&handle, |buf| buf.extend_from_slice(b"abc"))?;
        let len = table.with_entry(&handle, |buf| buf.len())?;
        assert_eq!(len, 3);
        Ok(())
    }

    #[test]
    fn test_clone_while_entry_is_borrowed() -> Result<()> {
        // Debug logging on, so the clone's log fields are evaluated; the
        // attach must not touch the RefCell while the entry is borrowed.
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let owner: SharedTable<u8> = SharedTable::new("sh", 1);
        let handle = owner.alloc(1);

        // A nested callback acquiring its own ownership mid-access.
        let borrower = owner.with_entry(&handle, |entry| {
            *entry += 1;
            owner.clone()
        })?;
        assert_eq!(borrower.use_count(), 2);
        assert_eq!(borrower.with_entry(&handle, |entry| *entry)?, 2);
        Ok(())
    }

    #[test]
    fn test_table_survives_until_last_owner_detaches() {
        let first: SharedTable<u8> = SharedTable::new("sh", 1);
        let handle = first.alloc(9);

        let second = first.clone();
        drop(first);

        // Storage is still live through the remaining owner.
        assert!(second.table().contains(&handle));
    }
}

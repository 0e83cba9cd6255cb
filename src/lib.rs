//! Handle tables
//!
//! Issues opaque textual references ("handles") to pooled resources so a
//! scripting or host layer can name and operate on them without ever
//! holding a raw address. A malformed, stale, or foreign handle string is
//! rejected with a descriptive error and never reaches entry storage.
//!
//! # Architecture
//!
//! ```text
//! HandleTable("fh", cap=4)
//!   ├─→ slots:  [ Alloc("fh0") | Free | Alloc("fh2") | Free ]
//!   ├─→ free list:  head → 3 → 1
//!   └─→ codec:  "fh" + decimal index, bounded width
//!
//! SharedTable ──Rc──→ HandleTable      (use count = owners attached)
//! WalkCursor  ──────→ ascending live scan over allocated slots
//! ```
//!
//! Allocation pops the free-list head, doubling storage when the list is
//! empty; freeing pushes the slot back and drops its value, so stale
//! handles can never observe old entry data. Tables are single-threaded
//! by contract; callers needing cross-thread access serialize externally.

#![warn(rust_2018_idioms)]

pub mod codec;
pub mod shared;
mod slots;
pub mod table;
pub mod walk;

// Re-exports for convenience
pub use error::{HandleError, Result};
pub use shared::SharedTable;
pub use table::{HandleTable, TableStats};
pub use walk::{Entries, WalkCursor};

/// Handle validation error types
pub mod error {
    use serde::Serialize;
    use thiserror::Error;

    /// Ways a textual handle can fail to translate back to an entry.
    ///
    /// Every variant carries the offending handle and the prefix of the
    /// table that rejected it, enough for a caller to build a precise
    /// diagnostic. Contract violations (freeing through a foreign table,
    /// reentrant borrows) are not represented here; they panic.
    #[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
    pub enum HandleError {
        /// The handle is not `<prefix>` followed by a decimal index.
        #[error("invalid handle \"{handle}\": expected \"{prefix}\" followed by a decimal index")]
        Format { handle: String, prefix: String },

        /// The handle was issued by a table with a different prefix.
        #[error("handle \"{handle}\" does not belong to the \"{prefix}\" table")]
        WrongTable { handle: String, prefix: String },

        /// The index lies past the table's current capacity.
        #[error(
            "handle \"{handle}\" is out of range for the \"{prefix}\" table (capacity {capacity})"
        )]
        Range {
            handle: String,
            prefix: String,
            capacity: usize,
        },

        /// The slot exists but is currently free.
        #[error("handle \"{handle}\" is not open in the \"{prefix}\" table")]
        Stale { handle: String, prefix: String },
    }

    pub type Result<T> = std::result::Result<T, HandleError>;
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

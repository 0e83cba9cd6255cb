//! Textual handle encoding and decoding.
//!
//! A handle is the table prefix followed by a decimal slot index, e.g.
//! `fh0` or `sock12`. The index is a `u32`, so the encoded index never
//! exceeds [`MAX_INDEX_WIDTH`] characters and the total handle length is
//! statically bounded by the prefix length plus [`MAX_INDEX_WIDTH`].
//!
//! Parsing is pure string work: it never inspects table storage. Range and
//! staleness checks belong to the table (see `HandleTable::translate`).

use crate::error::{HandleError, Result};

/// Maximum number of characters the encoded index occupies (`u32::MAX` in
/// decimal is 10 digits).
pub const MAX_INDEX_WIDTH: usize = 10;

/// Upper bound on the length of any handle issued for `prefix`.
pub fn max_handle_len(prefix: &str) -> usize {
    prefix.len() + MAX_INDEX_WIDTH
}

/// Format the handle for slot `index` of the table identified by `prefix`.
pub fn format_handle(prefix: &str, index: u32) -> String {
    let mut handle = String::with_capacity(max_handle_len(prefix));
    handle.push_str(prefix);
    handle.push_str(&index.to_string());
    handle
}

/// Parse `handle` back into a slot index for the table identified by
/// `prefix`.
///
/// Fails with `WrongTable` when the handle does not start with the exact
/// prefix, and with `Format` when the remainder is empty, not all decimal
/// digits, or wider than [`MAX_INDEX_WIDTH`].
pub fn parse_handle(prefix: &str, handle: &str) -> Result<u32> {
    let digits = handle
        .strip_prefix(prefix)
        .ok_or_else(|| HandleError::WrongTable {
            handle: handle.to_string(),
            prefix: prefix.to_string(),
        })?;

    if digits.is_empty()
        || digits.len() > MAX_INDEX_WIDTH
        || !digits.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(HandleError::Format {
            handle: handle.to_string(),
            prefix: prefix.to_string(),
        });
    }

    // 10 digits can still overflow u32 (e.g. 9999999999).
    digits.parse::<u32>().map_err(|_| HandleError::Format {
        handle: handle.to_string(),
        prefix: prefix.to_string(),
    })
}

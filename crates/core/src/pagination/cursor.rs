//! Cursor codec.
//!
//! A cursor is an opaque token for exactly one ordering key. The wire form
//! is the canonical decimal representation of the key; clients must not
//! parse it.

use std::fmt;

use crate::error::{PagingError, PagingResult};

/// Longest canonical decimal form of an `i64` (`-9223372036854775808`).
const MAX_CURSOR_LEN: usize = 20;

/// Opaque cursor for pagination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cursor {
    pub value: String,
}

impl Cursor {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl From<String> for Cursor {
    fn from(value: String) -> Self {
        Self { value }
    }
}

impl From<&str> for Cursor {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Encode an ordering key as a cursor.
pub fn encode_key(key: i64) -> Cursor {
    Cursor {
        value: key.to_string(),
    }
}

/// Decode a cursor back into its ordering key.
///
/// Only the canonical form produced by [`encode_key`] is accepted, so
/// `"+5"`, `"05"` or `" 5"` are rejected even though they would parse.
pub fn decode_key(cursor: &Cursor) -> PagingResult<i64> {
    let value = cursor.as_str();

    if value.is_empty() || value.len() > MAX_CURSOR_LEN {
        return Err(PagingError::InvalidCursor(truncate_for_error(value)));
    }

    let key: i64 = value
        .parse()
        .map_err(|_| PagingError::InvalidCursor(truncate_for_error(value)))?;

    if key.to_string() != value {
        return Err(PagingError::InvalidCursor(value.to_string()));
    }

    Ok(key)
}

// Bounded echo of untrusted input.
fn truncate_for_error(value: &str) -> String {
    value.chars().take(MAX_CURSOR_LEN + 1).collect()
}

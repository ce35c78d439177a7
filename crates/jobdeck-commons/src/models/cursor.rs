//! Keyset pagination cursor.
//!
//! The console never pages by offset: it remembers the sort-key of the first
//! or last row it displayed and asks the upstream API for rows before/after
//! that key. This keeps pages stable while jobs are inserted or updated
//! underneath the browser.

use serde::{Deserialize, Serialize};

/// One component of a pagination key.
///
/// Sort columns are either numeric (`id`, `ctime`, `mtime`) or textual
/// (`type`), and timestamps arrive as fractional epoch seconds, so the wire
/// value is one of three scalar shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyScalar {
    Int(i64),
    Float(f64),
    Text(String),
    /// Rows can lack a value for the sort column; the key component is then
    /// null on the wire.
    Null,
}

impl From<i64> for KeyScalar {
    fn from(v: i64) -> Self {
        KeyScalar::Int(v)
    }
}

impl From<f64> for KeyScalar {
    fn from(v: f64) -> Self {
        KeyScalar::Float(v)
    }
}

impl From<&str> for KeyScalar {
    fn from(v: &str) -> Self {
        KeyScalar::Text(v.to_string())
    }
}

/// Position within a sorted job listing.
///
/// An empty `last_key` with `forward_from_key = true` means "from the very
/// top"; empty with `false` means "from the very bottom". A non-empty key
/// holds `[primarySortValue]`, or `[primarySortValue, id]` when the primary
/// sort column is not `id` (the `id` tie-breaker keeps keys unique).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationCursor {
    #[serde(rename = "lastKey")]
    pub last_key: Vec<KeyScalar>,
    #[serde(rename = "forwardFromKey")]
    pub forward_from_key: bool,
}

impl PaginationCursor {
    /// Start of the listing.
    pub fn top() -> Self {
        Self {
            last_key: Vec::new(),
            forward_from_key: true,
        }
    }

    /// End of the listing.
    pub fn bottom() -> Self {
        Self {
            last_key: Vec::new(),
            forward_from_key: false,
        }
    }

    /// Continue forward (down the page) from a row key.
    pub fn after(key: Vec<KeyScalar>) -> Self {
        Self {
            last_key: key,
            forward_from_key: true,
        }
    }

    /// Continue backward (up the page) from a row key.
    pub fn before(key: Vec<KeyScalar>) -> Self {
        Self {
            last_key: key,
            forward_from_key: false,
        }
    }
}

impl Default for PaginationCursor {
    fn default() -> Self {
        Self::top()
    }
}

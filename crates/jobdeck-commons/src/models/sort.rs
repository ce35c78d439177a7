//! Sort order for job listings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Columns the upstream API accepts as a primary sort key.
///
/// `id` is the only column guaranteed unique, so it doubles as the
/// tie-breaker whenever another column is the primary key (see
/// [`PaginationCursor`](crate::PaginationCursor)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortField {
    #[serde(rename = "id")]
    Id,
    #[serde(rename = "ctime")]
    Ctime,
    #[serde(rename = "mtime")]
    Mtime,
    #[serde(rename = "type")]
    Type,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Ctime => "ctime",
            SortField::Mtime => "mtime",
            SortField::Type => "type",
        }
    }

    /// Whether values of this column are unique across jobs.
    pub fn is_unique(&self) -> bool {
        matches!(self, SortField::Id)
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "id" => Some(SortField::Id),
            "ctime" => Some(SortField::Ctime),
            "mtime" => Some(SortField::Mtime),
            "type" => Some(SortField::Type),
            _ => None,
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort specification: primary column plus direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    #[serde(rename = "sortBy")]
    pub field: SortField,
    #[serde(rename = "sortDesc")]
    pub descending: bool,
}

impl SortSpec {
    pub fn new(field: SortField, descending: bool) -> Self {
        Self { field, descending }
    }

    /// Ascending by the given column.
    pub fn ascending(field: SortField) -> Self {
        Self::new(field, false)
    }
}

impl Default for SortSpec {
    /// Most-recently-modified first, the console's landing order.
    fn default() -> Self {
        Self::new(SortField::Mtime, true)
    }
}

//! Pagination types for search results.

use serde::{Deserialize, Serialize};

/// The slice of a result set covered by one page.
///
/// A `limit` of zero means the requested page lies past the end of the
/// result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    /// Rows to skip.
    pub offset: u64,
    /// Rows to return.
    pub limit: u64,
    /// Number of pages for the whole result set.
    pub total_pages: u64,
}

impl PageWindow {
    /// Returns `true` if the window selects nothing.
    pub fn is_empty(&self) -> bool {
        self.limit == 0
    }

    /// The window as an `(offset, limit)` pair.
    pub fn bounds(&self) -> (u64, u64) {
        (self.offset, self.limit)
    }
}

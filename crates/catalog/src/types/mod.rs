//! Core types for the catalog search engine.
//!
//! - [`RawRequest`] - Request parameters exactly as the host received them
//! - [`CriterionKey`], [`CriterionValue`], [`ActiveCriteria`] - Normalized filters
//! - [`SearchControls`], [`SearchState`] - Grouping, ordering, paging and the
//!   state carried across requests
//! - [`PageWindow`] - Offset/limit window of a page
//! - [`ResultPage`], [`ExportTable`], [`SearchOutcome`] - Search results
//!
//! # Examples
//!
//! ```
//! use chemcat_catalog::types::{CriterionKey, RawRequest};
//!
//! let request = RawRequest::from_pairs([
//!     ("entity[]", "1"),
//!     ("entity[]", "2"),
//!     ("name", "benzene"),
//! ]);
//!
//! assert_eq!(request.get("entity"), Some(&["1".to_string(), "2".to_string()][..]));
//! assert_eq!(CriterionKey::parse("name"), Some(CriterionKey::Name));
//! ```

mod criteria;
mod pagination;
mod request;
mod results;
mod state;

pub use criteria::{ActiveCriteria, Criterion, CriterionKey, CriterionValue, RequestPreset};
pub use pagination::PageWindow;
pub use request::RawRequest;
pub use results::{ExportTable, ResultPage, Row, SearchOutcome, Suggestion};
pub use state::{DisplayBy, ExportFormat, OrderBy, SearchControls, SearchState, control};

/// Date-time format accepted by date criteria and used in exports.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

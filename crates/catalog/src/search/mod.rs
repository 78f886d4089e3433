//! Faceted search.
//!
//! This module holds the pieces of a search, leaf first:
//!
//! - [`CriterionRegistry`] - Supported filter keys, their values, joins and permissions
//! - [`fuzzy`] - Edit-distance name suggestions
//! - [`state_store`] - The search remembered between requests
//! - [`QueryComposer`] - Criteria to [`QueryPlan`]
//! - [`paginator`] - Page windows
//! - [`projector`] - Export flattening
//! - [`SearchEngine`] - The facade tying them together
//!
//! # Example
//!
//! ```
//! use chemcat_catalog::search::fuzzy::suggest;
//!
//! let found = suggest("benzeen", ["BENZENE", "TOLUENE", "BENZOATE"], 4);
//! assert_eq!(found[0].candidate, "BENZENE");
//! assert_eq!(found.len(), 2);
//! ```

pub mod composer;
pub mod engine;
pub mod fuzzy;
pub mod hierarchy;
pub mod paginator;
pub mod predicate;
pub mod projector;
pub mod registry;
pub mod state_store;

pub use composer::{Lookups, OrderTerm, Projection, QueryComposer, QueryPlan};
pub use engine::{SearchEngine, SearchSettings};
pub use predicate::{CompareOp, Field, Join, JoinMode, JoinPlan, Predicate, Scalar, Table};
pub use registry::{CriterionDefinition, CriterionRegistry, ValueKind};
pub use state_store::{InMemorySessionStore, SearchStateStore, SEARCH_STATE_KEY};

//! Collaborator traits.
//!
//! The search engine owns no storage. It talks to its surroundings through
//! the traits in this module:
//!
//! - [`StoreExecutor`] - Runs a composed [`QueryPlan`](crate::search::QueryPlan)
//! - [`LocationHierarchy`] - Walks the store location tree
//! - [`ReferenceCatalog`] - Reference data the composer and matcher need
//! - [`SessionStore`] - Per-session key/value storage
//! - [`PermissionOracle`] - Answers permission questions about a caller
//!
//! A backend usually implements the first three together; see
//! [`SqliteBackend`](crate::backends::sqlite::SqliteBackend).

mod session;
mod store;

pub use session::SessionStore;
pub use store::{LocationHierarchy, ReferenceCatalog, StoreExecutor};

use crate::caller::Permission;

/// Answers whether a caller holds a permission.
pub trait PermissionOracle {
    /// Returns `true` if `permission` is granted.
    fn has_permission(&self, permission: Permission) -> bool;
}

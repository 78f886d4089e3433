//! Caller identity for search operations.
//!
//! Every search runs on behalf of a [`CallerContext`]: the person issuing the
//! request, the entities they belong to, and the permissions granted to them
//! by the host application. The engine never authenticates anybody; it only
//! consults the context when a criterion is gated behind a permission.
//!
//! # Examples
//!
//! ```
//! use chemcat_catalog::caller::{CallerContext, Permission};
//!
//! let caller = CallerContext::builder(42)
//!     .entities(vec![3, 5])
//!     .permission(Permission::SelectSc)
//!     .build();
//!
//! assert!(caller.check_permission("entity", Permission::SelectSc).is_ok());
//! assert!(caller.check_permission("archive", Permission::ReadArchive).is_err());
//! assert!(!caller.can_see_restricted());
//! ```

mod context;
mod permissions;

pub use context::{CallerContext, CallerContextBuilder};
pub use permissions::{Permission, PermissionSet};

//! SQLite backend implementation.
//!
//! Implements [`StoreExecutor`](crate::core::StoreExecutor),
//! [`LocationHierarchy`](crate::core::LocationHierarchy) and
//! [`ReferenceCatalog`](crate::core::ReferenceCatalog) over a relational
//! catalog schema. Both in-memory databases (for tests) and file-based
//! databases are supported.
//!
//! # Example
//!
//! ```no_run
//! use chemcat_catalog::backends::sqlite::SqliteBackend;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = SqliteBackend::in_memory()?;
//! backend.init_schema()?;
//! backend.execute_batch(
//!     "INSERT INTO name (id, label, label_nost) VALUES (1, 'ACETONE', 'ACETONE');
//!      INSERT INTO product (id, name) VALUES (1, 1);",
//! )?;
//! # Ok(())
//! # }
//! ```
//!
//! # Schema
//!
//! ```text
//! product ──< storage >── store_location (tree via parent, owned by entity)
//!    │           └──< borrow
//!    ├── name
//!    ├──< bookmark
//!    └──< product_<field>  (synonym, class_of_compounds, risk_phrase, ...)
//! ```

mod backend;
mod query_builder;
mod schema;
mod search_impl;

pub use backend::{SqliteBackend, SqliteBackendConfig};
pub use query_builder::{QueryBuilder, SqlFragment, SqlParam};
pub use schema::{PRODUCT_LIST_FIELDS, SCHEMA_VERSION};

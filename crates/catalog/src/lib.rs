//! Chemcat Catalog Search Engine
//!
//! This crate implements the faceted search engine of a chemical inventory
//! catalog. Callers submit an open-ended set of independently optional filter
//! criteria; the engine validates them, composes a single predicate tree with
//! the joins it needs, executes it against a store, paginates the result and
//! proposes "did-you-mean" name suggestions.
//!
//! # Architecture
//!
//! - [`caller`] - Caller identity and the permissions the engine consults
//! - [`types`] - Criteria, search state, pagination and result types
//! - [`search`] - Registry, composer, fuzzy matcher, paginator, projector and
//!   the [`SearchEngine`](search::SearchEngine) facade
//! - [`core`] - Collaborator traits (store executor, location hierarchy,
//!   reference catalog, session store)
//! - [`backends`] - Backend implementations (SQLite)
//! - [`error`] - Error types for all operations
//!
//! # Backend Features
//!
//! - `sqlite` (default) - SQLite with in-memory and file modes
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use chemcat_catalog::backends::sqlite::SqliteBackend;
//! use chemcat_catalog::caller::{CallerContext, Permission};
//! use chemcat_catalog::search::{InMemorySessionStore, SearchEngine, SearchSettings};
//! use chemcat_catalog::types::RawRequest;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = Arc::new(SqliteBackend::in_memory()?);
//! backend.init_schema()?;
//!
//! let engine = SearchEngine::new(
//!     backend,
//!     Arc::new(InMemorySessionStore::new()),
//!     SearchSettings::default(),
//! );
//!
//! let caller = CallerContext::builder(7)
//!     .entities(vec![1])
//!     .permission(Permission::SelectSc)
//!     .build();
//!
//! let mut request = RawRequest::new();
//! request.push("name", "benzene");
//!
//! let outcome = engine.search(request, "session-7", &caller).await?;
//! println!("{} matches", outcome.total());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

pub mod backends;
pub mod caller;
pub mod core;
pub mod error;
pub mod search;
pub mod types;

pub use error::{CatalogError, CatalogResult, SessionError};

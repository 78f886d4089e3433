//! Application state for the catalog search API.
//!
//! Handlers share one [`SearchEngine`] and the server configuration.

use std::sync::Arc;

use chemcat_catalog::core::{LocationHierarchy, ReferenceCatalog, SessionStore, StoreExecutor};
use chemcat_catalog::search::{InMemorySessionStore, SearchEngine};

use crate::config::ServerConfig;

/// The engine type served by the API: any backend, type-erased sessions.
pub type SharedEngine<B> = SearchEngine<B, dyn SessionStore>;

/// Shared application state for the REST API.
///
/// # Type Parameters
///
/// * `B` - The catalog backend
///
/// # Example
///
/// ```rust,ignore
/// use chemcat_rest::{AppState, ServerConfig};
/// use chemcat_catalog::backends::sqlite::SqliteBackend;
/// use std::sync::Arc;
///
/// let backend = SqliteBackend::in_memory()?;
/// let state = AppState::new(Arc::new(backend), ServerConfig::default());
/// ```
pub struct AppState<B> {
    /// The search engine.
    engine: Arc<SharedEngine<B>>,

    /// Server configuration.
    config: Arc<ServerConfig>,
}

// Manually implement Clone since B is wrapped in Arc and doesn't need to be Clone
impl<B> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            config: Arc::clone(&self.config),
        }
    }
}

impl<B> AppState<B>
where
    B: StoreExecutor + LocationHierarchy + ReferenceCatalog + 'static,
{
    /// Creates state over `backend` with in-process session storage.
    pub fn new(backend: Arc<B>, config: ServerConfig) -> Self {
        Self::with_sessions(backend, Arc::new(InMemorySessionStore::new()), config)
    }

    /// Creates state over `backend` with the given session store.
    pub fn with_sessions(
        backend: Arc<B>,
        sessions: Arc<dyn SessionStore>,
        config: ServerConfig,
    ) -> Self {
        let engine = SearchEngine::new(backend, sessions, config.search_settings());
        Self {
            engine: Arc::new(engine),
            config: Arc::new(config),
        }
    }

    /// Returns the search engine.
    pub fn engine(&self) -> &SharedEngine<B> {
        &self.engine
    }

    /// Returns the backend.
    pub fn backend(&self) -> &B {
        self.engine.backend()
    }

    /// Returns a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

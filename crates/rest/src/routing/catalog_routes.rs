//! Catalog route configuration.

use axum::{
    Router,
    routing::{get, post},
};
use chemcat_catalog::core::{LocationHierarchy, ReferenceCatalog, StoreExecutor};

use crate::handlers;
use crate::state::AppState;

/// Creates all catalog API routes.
///
/// # Routes
///
/// - `GET /health` - Health check
/// - `GET /_liveness` - Liveness probe
/// - `GET /products/search` - Search
/// - `POST /products/_search` - Search (form body)
pub fn create_routes<B>(state: AppState<B>) -> Router
where
    B: StoreExecutor + LocationHierarchy + ReferenceCatalog + 'static,
{
    Router::new()
        .route("/health", get(handlers::health_handler::<B>))
        .route("/_liveness", get(handlers::liveness_handler))
        .route("/products/search", get(handlers::search_get_handler::<B>))
        .route("/products/_search", post(handlers::search_post_handler::<B>))
        .with_state(state)
}

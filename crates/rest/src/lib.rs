//! # chemcat-rest - Catalog Search HTTP API
//!
//! A thin JSON surface over the [`chemcat_catalog`] search engine, plus the
//! `chemcat` server binary.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use chemcat_rest::{create_app, ServerConfig};
//! use chemcat_catalog::backends::sqlite::SqliteBackend;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = SqliteBackend::open("chemcat.db")?;
//!     backend.init_schema()?;
//!
//!     let app = create_app(backend);
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## API Endpoints
//!
//! | Operation | HTTP Method | URL Pattern |
//! |-----------|-------------|-------------|
//! | search | GET | `/products/search?params` |
//! | search | POST | `/products/_search` (form body) |
//! | health | GET | `/health` |
//! | liveness | GET | `/_liveness` |
//!
//! Search parameters are the catalog filter keys (`name`, `entity`,
//! `store_location`, `class_of_compounds`, ...) and the controls
//! (`display_by`, `order_by`, `page`, `result_per_page`, `keep_last_search`,
//! `paginate`, `export_csv`, `export_html`, `is_did_you_mean`).
//!
//! ## HTTP Headers
//!
//! - `X-Person-ID` - Calling person (required)
//! - `X-Entity-IDs` - Comma-separated entity memberships
//! - `X-Permissions` - Comma-separated permission names
//! - `X-Session-ID` - Session for `keep_last_search`/`paginate`
//!
//! ## Error Handling
//!
//! Errors are returned as `{ "error": code, "message": text }`:
//!
//! | HTTP Status | Code | Description |
//! |-------------|------|-------------|
//! | 400 | bad_request | Missing or malformed caller headers |
//! | 400 | invalid_criterion | Unparseable filter or control value |
//! | 403 | forbidden | Filter requires a permission the caller lacks |
//! | 503 | store_unavailable | The catalog store failed |
//!
//! ## Architecture
//!
//! - [`error`] - Error types and their JSON rendering
//! - [`config`] - Server configuration
//! - [`state`] - Application state (search engine, configuration)
//! - [`handlers`] - HTTP request handlers
//! - [`extractors`] - Axum extractors for caller identity and parameters
//! - [`routing`] - Route configuration

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routing;
pub mod state;

pub use config::ServerConfig;
pub use error::{RestError, RestResult};
pub use state::AppState;

use std::sync::Arc;

use axum::Router;
use chemcat_catalog::core::{LocationHierarchy, ReferenceCatalog, StoreExecutor};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

/// Creates the Axum application with default configuration.
pub fn create_app<B>(backend: B) -> Router
where
    B: StoreExecutor + LocationHierarchy + ReferenceCatalog + 'static,
{
    create_app_with_config(backend, ServerConfig::default())
}

/// Creates the Axum application with custom configuration.
///
/// Sets up the routes, request tracing, the request timeout and, when
/// enabled, CORS.
pub fn create_app_with_config<B>(backend: B, config: ServerConfig) -> Router
where
    B: StoreExecutor + LocationHierarchy + ReferenceCatalog + 'static,
{
    info!(
        "Creating catalog API server with backend: {}",
        backend.backend_name()
    );

    let state = AppState::new(Arc::new(backend), config.clone());
    let router = routing::create_routes(state);

    let service_builder = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            axum::http::StatusCode::REQUEST_TIMEOUT,
            std::time::Duration::from_secs(config.request_timeout),
        ));

    let router = if config.enable_cors {
        router.layer(build_cors_layer(&config))
    } else {
        router
    };

    router.layer(service_builder)
}

/// Builds the CORS layer based on configuration.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if config.cors_origins == "*" {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

/// Initializes the tracing subscriber for logging.
///
/// This should be called once at application startup. `RUST_LOG`, when set,
/// takes precedence over `level`.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "chemcat_rest={level},chemcat_catalog={level},tower_http=debug"
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

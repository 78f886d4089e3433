//! Health check endpoint handlers.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chemcat_catalog::core::{LocationHierarchy, ReferenceCatalog, StoreExecutor};
use tracing::{debug, warn};

use crate::state::AppState;

/// Handler for the health check endpoint.
///
/// Pings the backend.
///
/// # HTTP Request
///
/// `GET [base]/health`
///
/// # Response
///
/// - `200 OK` - Backend reachable
/// - `503 Service Unavailable` - Backend failed its ping
pub async fn health_handler<B>(State(state): State<AppState<B>>) -> Response
where
    B: StoreExecutor + LocationHierarchy + ReferenceCatalog + 'static,
{
    debug!("Processing health check request");

    let backend = state.backend();
    let (status, label) = match backend.ping().await {
        Ok(()) => (StatusCode::OK, "healthy"),
        Err(err) => {
            warn!(error = %err, "Health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
        }
    };

    let body = serde_json::json!({
        "status": label,
        "backend": backend.backend_name(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    });

    (status, Json(body)).into_response()
}

/// Liveness probe; answers as long as the process serves requests.
///
/// # HTTP Request
///
/// `GET [base]/_liveness`
pub async fn liveness_handler() -> impl IntoResponse {
    StatusCode::OK
}

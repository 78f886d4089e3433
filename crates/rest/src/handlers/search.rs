//! Search handlers.
//!
//! - `GET [base]/products/search?params`
//! - `POST [base]/products/_search` with a form body
//!
//! A page of results is returned as JSON. `export_csv` streams the whole
//! result set as `text/csv`; `export_html` returns the export table as JSON
//! for the client to render.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chemcat_catalog::core::{LocationHierarchy, ReferenceCatalog, StoreExecutor};
use chemcat_catalog::types::{ExportFormat, RawRequest, SearchOutcome};
use tracing::debug;

use crate::error::RestResult;
use crate::extractors::{CallerExtractor, SearchParams};
use crate::state::AppState;

/// Handler for GET search.
///
/// # HTTP Request
///
/// `GET [base]/products/search?name=acetone&entity=1&page=0`
///
/// # Response
///
/// - `200 OK` with a result page, or CSV for `export_csv`
/// - `400 Bad Request` for malformed values or caller headers
/// - `403 Forbidden` when a filter needs a permission the caller lacks
/// - `503 Service Unavailable` when the store fails
pub async fn search_get_handler<B>(
    State(state): State<AppState<B>>,
    caller: CallerExtractor,
    SearchParams(request): SearchParams,
) -> RestResult<Response>
where
    B: StoreExecutor + LocationHierarchy + ReferenceCatalog + 'static,
{
    debug!(params = request.len(), "Processing GET search");
    run_search(&state, &caller, request).await
}

/// Handler for POST search.
///
/// Form parameters are merged after any query string parameters.
///
/// # HTTP Request
///
/// `POST [base]/products/_search`
/// `Content-Type: application/x-www-form-urlencoded`
pub async fn search_post_handler<B>(
    State(state): State<AppState<B>>,
    caller: CallerExtractor,
    SearchParams(mut request): SearchParams,
    body: Bytes,
) -> RestResult<Response>
where
    B: StoreExecutor + LocationHierarchy + ReferenceCatalog + 'static,
{
    for (key, values) in SearchParams::parse(&body).into_inner().iter() {
        for value in values {
            request.push(key, value.clone());
        }
    }
    debug!(params = request.len(), "Processing POST search");
    run_search(&state, &caller, request).await
}

async fn run_search<B>(
    state: &AppState<B>,
    caller: &CallerExtractor,
    request: RawRequest,
) -> RestResult<Response>
where
    B: StoreExecutor + LocationHierarchy + ReferenceCatalog + 'static,
{
    let outcome = state
        .engine()
        .search(request, caller.session_id(), caller.context())
        .await?;

    let response = match outcome {
        SearchOutcome::Page(page) => (StatusCode::OK, Json(page)).into_response(),
        SearchOutcome::Export(table) => match table.format {
            ExportFormat::Csv => (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                    (
                        header::CONTENT_DISPOSITION,
                        "attachment; filename=\"products.csv\"",
                    ),
                ],
                table.to_csv()?,
            )
                .into_response(),
            ExportFormat::Html => (StatusCode::OK, Json(table)).into_response(),
        },
    };
    Ok(response)
}

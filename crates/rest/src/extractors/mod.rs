//! Axum extractors for catalog requests.
//!
//! - [`CallerExtractor`] - Caller identity and session from headers
//! - [`SearchParams`] - Search parameters from the query string

mod caller;
mod search_params;

pub use caller::{CallerExtractor, X_ENTITY_IDS, X_PERMISSIONS, X_PERSON_ID, X_SESSION_ID};
pub use search_params::SearchParams;

//! Error types for the catalog search API.
//!
//! Every error renders as a JSON body `{ "error": code, "message": text }`.
//!
//! # Error Mapping
//!
//! | Catalog Error | HTTP Status | Code |
//! |--------------|-------------|------|
//! | Forbidden | 403 | forbidden |
//! | InvalidCriterion | 400 | invalid_criterion |
//! | StoreUnavailable | 503 | store_unavailable |

use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chemcat_catalog::CatalogError;

/// The error type of REST operations.
#[derive(Debug)]
pub enum RestError {
    /// Malformed request outside the search criteria, e.g. caller headers (HTTP 400).
    BadRequest {
        /// Error message.
        message: String,
    },

    /// A criterion or control value was rejected (HTTP 400).
    InvalidCriterion {
        /// Error message.
        message: String,
    },

    /// The caller lacks a permission (HTTP 403).
    Forbidden {
        /// Error message.
        message: String,
    },

    /// The store could not be reached (HTTP 503).
    ServiceUnavailable {
        /// Error message.
        message: String,
    },

    /// Internal server error (HTTP 500).
    InternalError {
        /// Error message.
        message: String,
    },
}

impl RestError {
    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            RestError::BadRequest { .. } => "bad_request",
            RestError::InvalidCriterion { .. } => "invalid_criterion",
            RestError::Forbidden { .. } => "forbidden",
            RestError::ServiceUnavailable { .. } => "store_unavailable",
            RestError::InternalError { .. } => "internal_error",
        }
    }

    /// HTTP status of the error.
    pub fn status(&self) -> StatusCode {
        match self {
            RestError::BadRequest { .. } | RestError::InvalidCriterion { .. } => {
                StatusCode::BAD_REQUEST
            }
            RestError::Forbidden { .. } => StatusCode::FORBIDDEN,
            RestError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            RestError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            RestError::BadRequest { message }
            | RestError::InvalidCriterion { message }
            | RestError::Forbidden { message }
            | RestError::ServiceUnavailable { message }
            | RestError::InternalError { message } => message,
        }
    }
}

impl fmt::Display for RestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestError::BadRequest { message } => write!(f, "Bad request: {}", message),
            RestError::InvalidCriterion { message } => write!(f, "Invalid criterion: {}", message),
            RestError::Forbidden { message } => write!(f, "Forbidden: {}", message),
            RestError::ServiceUnavailable { message } => {
                write!(f, "Service unavailable: {}", message)
            }
            RestError::InternalError { message } => write!(f, "Internal error: {}", message),
        }
    }
}

impl std::error::Error for RestError {}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        if self.status().is_server_error() {
            tracing::error!(code = self.code(), "{}", self);
        }
        let body = serde_json::json!({
            "error": self.code(),
            "message": self.message(),
        });
        (self.status(), Json(body)).into_response()
    }
}

impl From<CatalogError> for RestError {
    fn from(err: CatalogError) -> Self {
        let message = err.to_string();
        match err {
            CatalogError::Forbidden { .. } => RestError::Forbidden { message },
            CatalogError::InvalidCriterion { .. } => RestError::InvalidCriterion { message },
            CatalogError::StoreUnavailable { .. } => RestError::ServiceUnavailable { message },
            CatalogError::Export { .. } => RestError::InternalError { message },
        }
    }
}

/// Result type for REST operations.
pub type RestResult<T> = Result<T, RestError>;

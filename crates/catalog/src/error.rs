//! Error types for the catalog search engine.
//!
//! [`CatalogError`] is the only error that leaves the engine. Session storage
//! failures have their own [`SessionError`] type, which the engine logs and
//! swallows so that a broken session store degrades to "no prior search".

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

use crate::caller::Permission;

/// The primary error type for search operations.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The caller supplied a filter it is not allowed to use.
    #[error("criterion '{key}' requires the '{permission}' permission")]
    Forbidden { key: String, permission: Permission },

    /// A criterion or control value could not be parsed.
    #[error("invalid value for '{key}': {message}")]
    InvalidCriterion { key: String, message: String },

    /// The backing store failed while counting or fetching rows.
    #[error("store unavailable: {message}")]
    StoreUnavailable {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Export rows could not be rendered.
    #[error("export failed: {message}")]
    Export { message: String },
}

impl CatalogError {
    /// Builds a [`CatalogError::Forbidden`] for the given key.
    pub fn forbidden(key: impl Into<String>, permission: Permission) -> Self {
        CatalogError::Forbidden {
            key: key.into(),
            permission,
        }
    }

    /// Builds a [`CatalogError::InvalidCriterion`] for the given key.
    pub fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        CatalogError::InvalidCriterion {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Builds a [`CatalogError::StoreUnavailable`] without an underlying source.
    pub fn unavailable(message: impl Into<String>) -> Self {
        CatalogError::StoreUnavailable {
            message: message.into(),
            source: None,
        }
    }

    /// Short machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            CatalogError::Forbidden { .. } => "forbidden",
            CatalogError::InvalidCriterion { .. } => "invalid_criterion",
            CatalogError::StoreUnavailable { .. } => "store_unavailable",
            CatalogError::Export { .. } => "export_failed",
        }
    }
}

/// Errors raised by a [`SessionStore`](crate::core::SessionStore).
#[derive(Error, Debug)]
pub enum SessionError {
    /// The session backend could not be reached.
    #[error("session store unavailable: {message}")]
    Unavailable { message: String },

    /// A stored value could not be decoded.
    #[error("corrupt session value for '{key}': {message}")]
    Corrupt { key: String, message: String },
}

/// Result type alias for search operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Result type alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

impl From<csv::Error> for CatalogError {
    fn from(err: csv::Error) -> Self {
        CatalogError::Export {
            message: err.to_string(),
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for CatalogError {
    fn from(err: rusqlite::Error) -> Self {
        CatalogError::StoreUnavailable {
            message: format!("sqlite: {}", err),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<r2d2::Error> for CatalogError {
    fn from(err: r2d2::Error) -> Self {
        CatalogError::StoreUnavailable {
            message: format!("sqlite connection pool: {}", err),
            source: Some(Box::new(err)),
        }
    }
}

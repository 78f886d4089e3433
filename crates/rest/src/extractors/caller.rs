//! Caller identity extractor.
//!
//! The catalog trusts an upstream authentication layer to forward who is
//! calling through request headers:
//!
//! | Header | Required | Meaning |
//! |--------|----------|---------|
//! | `X-Person-ID` | yes | Numeric person id |
//! | `X-Entity-IDs` | no | Comma-separated entity ids the person belongs to |
//! | `X-Permissions` | no | Comma-separated permission names (`select_sc`, `read_rpc`, ...) |
//! | `X-Session-ID` | no | Session holding the last search; defaults to the person id |

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, HeaderName, request::Parts},
};
use chemcat_catalog::caller::{CallerContext, Permission, PermissionSet};

use crate::error::RestError;

/// Person id header.
pub const X_PERSON_ID: HeaderName = HeaderName::from_static("x-person-id");

/// Entity ids header.
pub const X_ENTITY_IDS: HeaderName = HeaderName::from_static("x-entity-ids");

/// Permissions header.
pub const X_PERMISSIONS: HeaderName = HeaderName::from_static("x-permissions");

/// Session id header.
pub const X_SESSION_ID: HeaderName = HeaderName::from_static("x-session-id");

/// Axum extractor for the calling person and their session.
///
/// # Example
///
/// ```rust,ignore
/// use chemcat_rest::extractors::CallerExtractor;
///
/// async fn handler(caller: CallerExtractor) {
///     println!("person {} in session {}", caller.context().person_id(), caller.session_id());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CallerExtractor {
    context: CallerContext,
    session_id: String,
}

impl CallerExtractor {
    /// Builds the caller from request headers.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, RestError> {
        let person_id = header_str(headers, &X_PERSON_ID)
            .ok_or_else(|| bad_request("missing X-Person-ID header"))?
            .parse::<i64>()
            .map_err(|_| bad_request("X-Person-ID must be an integer"))?;

        let entity_ids = header_str(headers, &X_ENTITY_IDS)
            .map(|raw| {
                split_list(raw)
                    .map(|id| {
                        id.parse::<i64>()
                            .map_err(|_| bad_request(format!("invalid entity id '{}'", id)))
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?
            .unwrap_or_default();

        let permissions = header_str(headers, &X_PERMISSIONS)
            .map(|raw| {
                split_list(raw)
                    .map(|name| {
                        name.parse::<Permission>()
                            .map_err(|_| bad_request(format!("unknown permission '{}'", name)))
                    })
                    .collect::<Result<PermissionSet, _>>()
            })
            .transpose()?
            .unwrap_or_default();

        let session_id = header_str(headers, &X_SESSION_ID)
            .map(String::from)
            .unwrap_or_else(|| format!("person-{}", person_id));

        let context = CallerContext::builder(person_id)
            .entities(entity_ids)
            .permissions(permissions)
            .build();

        Ok(Self {
            context,
            session_id,
        })
    }

    /// Returns the caller context.
    pub fn context(&self) -> &CallerContext {
        &self.context
    }

    /// Returns the session id.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn bad_request(message: impl Into<String>) -> RestError {
    RestError::BadRequest {
        message: message.into(),
    }
}

impl<S> FromRequestParts<S> for CallerExtractor
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers)
    }
}

//! Search parameters extractor.
//!
//! Decodes `application/x-www-form-urlencoded` pairs into a [`RawRequest`].
//! Repeated keys (`entity=1&entity=2`) and PHP-style list keys
//! (`entity[]=1`) both accumulate into one list.

use axum::{extract::FromRequestParts, http::request::Parts};
use chemcat_catalog::types::RawRequest;

use crate::error::RestError;

/// Axum extractor for the query string of a search.
#[derive(Debug, Default, Clone)]
pub struct SearchParams(pub RawRequest);

impl SearchParams {
    /// Parses a URL-encoded string.
    pub fn parse(encoded: &[u8]) -> Self {
        Self(RawRequest::from_pairs(url::form_urlencoded::parse(encoded)))
    }

    /// Consumes the extractor and returns the request.
    pub fn into_inner(self) -> RawRequest {
        self.0
    }
}

impl<S> FromRequestParts<S> for SearchParams
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::parse(parts.uri.query().unwrap_or_default().as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lists_and_encoding() {
        let params = SearchParams::parse(b"entity=1&entity%5B%5D=2&name=acetic+acid&is_cmr");
        let request = params.into_inner();

        assert_eq!(
            request.get("entity"),
            Some(&["1".to_string(), "2".to_string()][..])
        );
        assert_eq!(request.first("name"), Some("acetic acid"));
        assert!(request.contains("is_cmr"));
    }

    #[test]
    fn test_empty_query() {
        assert!(SearchParams::parse(b"").into_inner().is_empty());
    }
}

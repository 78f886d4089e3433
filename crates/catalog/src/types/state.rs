//! Search controls and the state carried between requests.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::request::RawRequest;
use crate::error::{CatalogError, CatalogResult};

/// Names of the request parameters that steer a search without filtering it.
pub mod control {
    /// Row grouping: `product` or `storage`.
    pub const DISPLAY_BY: &str = "display_by";
    /// Ordering of storage rows: `storage` or `borrower`.
    pub const ORDER_BY: &str = "order_by";
    /// Zero-based page number.
    pub const PAGE: &str = "page";
    /// Rows per page.
    pub const RESULT_PER_PAGE: &str = "result_per_page";
    /// Alias of [`RESULT_PER_PAGE`].
    pub const PAGE_SIZE: &str = "page_size";
    /// Merge the previous search into this one.
    pub const KEEP_LAST_SEARCH: &str = "keep_last_search";
    /// Page navigation; implies [`KEEP_LAST_SEARCH`].
    pub const PAGINATE: &str = "paginate";
    /// Export every matching row as CSV.
    pub const EXPORT_CSV: &str = "export_csv";
    /// Export every matching row as a table.
    pub const EXPORT_HTML: &str = "export_html";
    /// Rank the exact name match first.
    pub const IS_DID_YOU_MEAN: &str = "is_did_you_mean";
    /// Entity searched by `request=entity`.
    pub const IS_IN_ENTITY: &str = "is_in_entity";
    /// Store location searched by `request=store_location`.
    pub const IS_IN_STORE_LOCATION: &str = "is_in_store_location";

    /// Controls restored from the session alongside criteria.
    pub const CARRIED: [&str; 4] = [DISPLAY_BY, ORDER_BY, PAGE, RESULT_PER_PAGE];
}

/// How result rows are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayBy {
    /// One row per product.
    #[default]
    Product,
    /// One row per storage unit.
    Storage,
}

impl DisplayBy {
    /// Parses the `display_by` value; anything but `storage` groups by product.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("storage") => DisplayBy::Storage,
            _ => DisplayBy::Product,
        }
    }

    /// Request parameter value.
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayBy::Product => "product",
            DisplayBy::Storage => "storage",
        }
    }
}

/// Ordering of storage rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderBy {
    /// By store location.
    Storage,
    /// By borrower, then store location.
    #[default]
    Borrower,
}

impl OrderBy {
    /// Parses the `order_by` value; anything but `storage` orders by borrower.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("storage") => OrderBy::Storage,
            _ => OrderBy::Borrower,
        }
    }

    /// Request parameter value.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderBy::Storage => "storage",
            OrderBy::Borrower => "borrower",
        }
    }
}

/// Export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Comma separated values.
    Csv,
    /// A table for an HTML page.
    Html,
}

/// Controls resolved from a (merged) request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchControls {
    /// Row grouping.
    pub display_by: DisplayBy,
    /// Ordering of storage rows.
    pub order_by: OrderBy,
    /// Zero-based page number.
    pub page: u64,
    /// Rows per page, already clamped.
    pub page_size: u64,
    /// `keep_last_search` or `paginate` was sent.
    pub keep_last_search: bool,
    /// Requested export, if any.
    pub export: Option<ExportFormat>,
    /// Rank the exact name match first.
    pub did_you_mean: bool,
}

impl SearchControls {
    /// Reads the controls of `request`.
    ///
    /// A page size of zero, or a page or page size that is not a number,
    /// is an [`CatalogError::InvalidCriterion`]. Page sizes above
    /// `max_page_size` are clamped.
    pub fn from_request(
        request: &RawRequest,
        default_page_size: u64,
        max_page_size: u64,
    ) -> CatalogResult<Self> {
        let page = match non_blank(request, control::PAGE) {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                CatalogError::invalid(control::PAGE, format!("'{}' is not a page number", raw))
            })?,
            None => 0,
        };

        let size_key = if request.contains(control::RESULT_PER_PAGE) {
            control::RESULT_PER_PAGE
        } else {
            control::PAGE_SIZE
        };
        let page_size = match non_blank(request, size_key) {
            Some(raw) => {
                let size = raw.parse::<u64>().map_err(|_| {
                    CatalogError::invalid(
                        control::RESULT_PER_PAGE,
                        format!("'{}' is not a page size", raw),
                    )
                })?;
                if size == 0 {
                    return Err(CatalogError::invalid(
                        control::RESULT_PER_PAGE,
                        "page size must be greater than zero",
                    ));
                }
                size.min(max_page_size)
            }
            None => default_page_size,
        };

        let export = if request.contains(control::EXPORT_CSV) {
            Some(ExportFormat::Csv)
        } else if request.contains(control::EXPORT_HTML) {
            Some(ExportFormat::Html)
        } else {
            None
        };

        Ok(Self {
            display_by: DisplayBy::parse(request.first(control::DISPLAY_BY)),
            order_by: OrderBy::parse(request.first(control::ORDER_BY)),
            page,
            page_size,
            keep_last_search: request.contains(control::KEEP_LAST_SEARCH)
                || request.contains(control::PAGINATE),
            export,
            did_you_mean: request.contains(control::IS_DID_YOU_MEAN),
        })
    }
}

fn non_blank<'a>(request: &'a RawRequest, key: &str) -> Option<&'a str> {
    request.first(key).map(str::trim).filter(|v| !v.is_empty())
}

/// The search a session remembers between requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchState {
    /// Recognized criterion keys and their raw values.
    #[serde(default)]
    pub criteria: BTreeMap<String, Vec<String>>,
    /// Row grouping.
    #[serde(default)]
    pub display_by: DisplayBy,
    /// Ordering of storage rows.
    #[serde(default)]
    pub order_by: OrderBy,
    /// Zero-based page number.
    #[serde(default)]
    pub page: u64,
    /// Rows per page.
    pub page_size: u64,
}

impl SearchState {
    /// A state with no criteria and default controls.
    pub fn empty(page_size: u64) -> Self {
        Self {
            criteria: BTreeMap::new(),
            display_by: DisplayBy::default(),
            order_by: OrderBy::default(),
            page: 0,
            page_size,
        }
    }

    /// Raw value of a carried control, as it would appear in a request.
    pub fn control_value(&self, name: &str) -> Option<String> {
        match name {
            control::DISPLAY_BY => Some(self.display_by.as_str().to_string()),
            control::ORDER_BY => Some(self.order_by.as_str().to_string()),
            control::PAGE => Some(self.page.to_string()),
            control::RESULT_PER_PAGE | control::PAGE_SIZE => Some(self.page_size.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controls(pairs: &[(&str, &str)]) -> CatalogResult<SearchControls> {
        SearchControls::from_request(&RawRequest::from_pairs(pairs.iter().copied()), 10, 1000)
    }

    #[test]
    fn test_defaults() {
        let c = controls(&[]).unwrap();
        assert_eq!(c.display_by, DisplayBy::Product);
        assert_eq!(c.order_by, OrderBy::Borrower);
        assert_eq!(c.page, 0);
        assert_eq!(c.page_size, 10);
        assert!(!c.keep_last_search);
        assert!(c.export.is_none());
    }

    #[test]
    fn test_paginate_implies_keep() {
        let c = controls(&[("paginate", ""), ("page", "2")]).unwrap();
        assert!(c.keep_last_search);
        assert_eq!(c.page, 2);
    }

    #[test]
    fn test_page_size_alias_and_clamp() {
        assert_eq!(controls(&[("page_size", "25")]).unwrap().page_size, 25);
        assert_eq!(controls(&[("result_per_page", "5000")]).unwrap().page_size, 1000);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        match controls(&[("result_per_page", "0")]) {
            Err(CatalogError::InvalidCriterion { key, .. }) => assert_eq!(key, "result_per_page"),
            other => panic!("expected InvalidCriterion, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_page_rejected() {
        assert!(controls(&[("page", "two")]).is_err());
    }

    #[test]
    fn test_export_flags() {
        assert_eq!(controls(&[("export_csv", "1")]).unwrap().export, Some(ExportFormat::Csv));
        assert_eq!(controls(&[("export_html", "")]).unwrap().export, Some(ExportFormat::Html));
    }

    #[test]
    fn test_state_json_shape() {
        let mut state = SearchState::empty(10);
        state.criteria.insert("name".into(), vec!["benzene".into()]);
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["display_by"], "product");
        assert_eq!(json["order_by"], "borrower");
        assert_eq!(json["criteria"]["name"][0], "benzene");
    }
}

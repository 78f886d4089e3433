//! Route configuration for the catalog search API.

pub mod catalog_routes;

pub use catalog_routes::create_routes;

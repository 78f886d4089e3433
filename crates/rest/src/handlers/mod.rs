//! HTTP request handlers.
//!
//! - [`search`] - Product search (GET and POST)
//! - [`health`] - Health and liveness endpoints

pub mod health;
pub mod search;

pub use health::{health_handler, liveness_handler};
pub use search::{search_get_handler, search_post_handler};

//! Test infrastructure for the catalog search engine.

pub mod fixtures;

pub use fixtures::*;

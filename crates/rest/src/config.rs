//! Server configuration for the catalog search API.
//!
//! Configuration comes from command line arguments with environment
//! variable fallbacks, or is built programmatically.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CHEMCAT_PORT` | 8080 | Server port |
//! | `CHEMCAT_HOST` | 127.0.0.1 | Host to bind |
//! | `CHEMCAT_LOG_LEVEL` | info | Log level |
//! | `CHEMCAT_DATABASE_URL` | chemcat.db | SQLite database path (`:memory:` allowed) |
//! | `CHEMCAT_REQUEST_TIMEOUT` | 30 | Request timeout (seconds) |
//! | `CHEMCAT_ENABLE_CORS` | true | Enable CORS |
//! | `CHEMCAT_CORS_ORIGINS` | * | Allowed origins |
//! | `CHEMCAT_DEFAULT_PAGE_SIZE` | 10 | Page size when a request names none |
//! | `CHEMCAT_MAX_PAGE_SIZE` | 1000 | Largest page size honoured |
//! | `CHEMCAT_SUGGESTION_THRESHOLD` | 4 | Maximum edit distance of name suggestions |
//!
//! # Example
//!
//! ```rust
//! use chemcat_rest::ServerConfig;
//!
//! let config = ServerConfig {
//!     port: 3000,
//!     host: "0.0.0.0".to_string(),
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use chemcat_catalog::search::SearchSettings;
use clap::Parser;

/// Server configuration for the catalog search API.
#[derive(Debug, Clone, Parser)]
#[command(name = "chemcat")]
#[command(about = "Chemical inventory catalog search server")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(short, long, env = "CHEMCAT_PORT", default_value = "8080")]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "CHEMCAT_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "CHEMCAT_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// SQLite database path.
    #[arg(long, env = "CHEMCAT_DATABASE_URL")]
    pub database_url: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, env = "CHEMCAT_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,

    /// Enable CORS.
    #[arg(long, env = "CHEMCAT_ENABLE_CORS", default_value = "true")]
    pub enable_cors: bool,

    /// Allowed CORS origins (comma-separated, or * for all).
    #[arg(long, env = "CHEMCAT_CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,

    /// Page size when a request names none.
    #[arg(long, env = "CHEMCAT_DEFAULT_PAGE_SIZE", default_value = "10")]
    pub default_page_size: u64,

    /// Maximum page size; larger requests are clamped.
    #[arg(long, env = "CHEMCAT_MAX_PAGE_SIZE", default_value = "1000")]
    pub max_page_size: u64,

    /// Maximum edit distance of a "did you mean" suggestion.
    #[arg(long, env = "CHEMCAT_SUGGESTION_THRESHOLD", default_value = "4")]
    pub suggestion_threshold: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            log_level: "info".to_string(),
            database_url: None,
            request_timeout: 30,
            enable_cors: true,
            cors_origins: "*".to_string(),
            default_page_size: 10,
            max_page_size: 1000,
            suggestion_threshold: 4,
        }
    }
}

impl ServerConfig {
    /// Creates a ServerConfig from environment variables, falling back to
    /// defaults when they do not parse.
    pub fn from_env() -> Self {
        Self::try_parse_from(["chemcat"]).unwrap_or_default()
    }

    /// Configuration for tests: in-memory database, no CORS.
    pub fn for_testing() -> Self {
        Self {
            port: 0,
            database_url: Some(":memory:".to_string()),
            enable_cors: false,
            ..Default::default()
        }
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the database path, defaulting to `chemcat.db`.
    pub fn database_path(&self) -> &str {
        self.database_url.as_deref().unwrap_or("chemcat.db")
    }

    /// Search engine settings derived from this configuration.
    pub fn search_settings(&self) -> SearchSettings {
        SearchSettings {
            default_page_size: self.default_page_size,
            max_page_size: self.max_page_size,
            suggestion_threshold: self.suggestion_threshold,
        }
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.request_timeout == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }

        if self.default_page_size == 0 {
            errors.push("Default page size cannot be 0".to_string());
        }

        if self.default_page_size > self.max_page_size {
            errors.push("Default page size cannot exceed max page size".to_string());
        }

        if !matches!(
            self.log_level.to_ascii_lowercase().as_str(),
            "error" | "warn" | "info" | "debug" | "trace"
        ) {
            errors.push(format!("Unknown log level '{}'", self.log_level));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.socket_addr(), "127.0.0.1:8080");
        assert_eq!(config.database_path(), "chemcat.db");
    }

    #[test]
    fn test_validate_collects_errors() {
        let config = ServerConfig {
            request_timeout: 0,
            default_page_size: 2000,
            log_level: "loud".to_string(),
            ..Default::default()
        };
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_search_settings() {
        let config = ServerConfig {
            default_page_size: 25,
            max_page_size: 100,
            ..ServerConfig::for_testing()
        };
        let settings = config.search_settings();
        assert_eq!(settings.default_page_size, 25);
        assert_eq!(settings.max_page_size, 100);
        assert_eq!(settings.suggestion_threshold, 4);
        assert_eq!(config.database_path(), ":memory:");
    }

    #[test]
    fn test_parse_from_args() {
        let config =
            ServerConfig::try_parse_from(["chemcat", "--port", "9000", "--max-page-size", "50"])
                .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.max_page_size, 50);
    }
}

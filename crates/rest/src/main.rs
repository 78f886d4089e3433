//! Chemcat catalog search server.

use clap::Parser;
use chemcat_rest::{ServerConfig, create_app_with_config, init_logging};
use tracing::info;

#[cfg(feature = "sqlite")]
use chemcat_catalog::backends::sqlite::SqliteBackend;

/// Creates and initializes a SQLite backend from the server configuration.
#[cfg(feature = "sqlite")]
fn create_sqlite_backend(config: &ServerConfig) -> anyhow::Result<SqliteBackend> {
    let db_path = config.database_path();
    info!(database = %db_path, "Initializing SQLite backend");

    let backend = SqliteBackend::open(db_path)?;
    backend.init_schema()?;

    Ok(backend)
}

/// Starts the Axum HTTP server.
async fn serve(app: axum::Router, config: &ServerConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr();
    info!(address = %addr, "Server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    info!(
        port = config.port,
        host = %config.host,
        default_page_size = config.default_page_size,
        max_page_size = config.max_page_size,
        "Starting Chemcat catalog server"
    );

    start(config).await
}

#[cfg(feature = "sqlite")]
async fn start(config: ServerConfig) -> anyhow::Result<()> {
    let backend = create_sqlite_backend(&config)?;
    let app = create_app_with_config(backend, config.clone());
    serve(app, &config).await
}

/// Fallback when sqlite feature is not enabled.
#[cfg(not(feature = "sqlite"))]
async fn start(_config: ServerConfig) -> anyhow::Result<()> {
    anyhow::bail!(
        "The server requires the 'sqlite' feature. \
         Build with: cargo build -p chemcat-rest --features sqlite"
    )
}

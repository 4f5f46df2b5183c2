//! # showcase-server
//!
//! HTTP server for the product showcase.
//!
//! This binary provides:
//! - **Upload endpoint** (`POST /api/upload`) that validates a multipart
//!   product submission, stores its image and persists the product
//! - **Listing** as JSON (`GET /api/products`) and as an HTML page (`GET /`),
//!   newest products first
//! - **Pluggable image storage**: inline base64 in the product document, or a
//!   Cloudinary-compatible remote asset service
//! - **SQLite document store**, connected lazily and shared across requests

mod api;
mod config;
mod error;
mod gateway;
mod image_store;
mod listing;
mod page;
mod pipeline;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::api::AppState;
use crate::config::ServerConfig;
use crate::gateway::SqliteGateway;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,showcase_server=debug")),
        )
        .init();

    info!("Starting product showcase server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Initialize subsystems
    // -----------------------------------------------------------------------

    // Image store (inline or remote asset service)
    let images = image_store::from_config(&config.image_storage, config.asset_timeout)
        .map_err(|e| anyhow::anyhow!("Failed to initialize image store: {e}"))?;

    // Document store; the connection opens on the first request
    let products = Arc::new(SqliteGateway::new(
        config.database_path.clone(),
        config.store_timeout,
    ));

    let app_state = AppState::new(&config, images, products);

    // -----------------------------------------------------------------------
    // 4. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    tokio::select! {
        result = api::serve(app_state, config.http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}

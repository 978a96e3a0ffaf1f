//! tabdeck server entry point.
//!
//! This is the main binary that boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use anyhow::{Context, Result};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tabdeck_core::AppConfig;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod state;
mod tabs;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    tracing::info!(db = %config.db_path.display(), "starting tabdeck server on stdio transport");

    let state = state::AppState::open(&config).await.context("opening stores")?;
    let handler = handler::TabdeckServer::new(state);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}

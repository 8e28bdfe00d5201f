//! Gateway entry point.
//!
//! Loads configuration, initializes logging, opens the storage backends and
//! starts the configured transport.

use anyhow::Result;
use tracing::info;

use kv_mcp_gateway::core::{Config, McpServer, TransportService, init_logging};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from environment
    let config = Config::from_env();

    let _log_guard = init_logging(&config.logging);

    info!("Starting {} v{}", config.server.name, config.server.version);

    // Opening the embedded store is the only fatal storage failure
    let server = McpServer::bootstrap(config.clone()).await?;

    info!("Server initialized");

    let transport = TransportService::new(config.transport);
    let result = transport.run(server.clone()).await;

    server.shutdown().await;
    info!("Server shutting down");

    result?;
    Ok(())
}

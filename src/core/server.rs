//! MCP server implementation and lifecycle management.
//!
//! [`McpServer`] owns the backends, the dispatcher and the health service.
//! Every transport talks to it: HTTP through the REST and JSON-RPC handlers,
//! stdio through the rmcp `ServerHandler` impl and its tool router.

use rmcp::{ServerHandler, handler::server::tool::ToolRouter, model::*, tool_handler};
use std::sync::Arc;
use tracing::{info, warn};

use super::config::Config;
// No `Result` alias import: `#[tool_handler]` expands to the std two-parameter `Result`.
use crate::domains::health::HealthService;
use crate::domains::storage::{Backends, PostgresStore, SqliteStore};
use crate::domains::tools::{Dispatcher, ToolContext, ToolDescriptor, build_tool_router};

const INSTRUCTIONS: &str = "Key/value storage over SQLite (always available) and PostgreSQL \
(when configured). Use sqlite_* or pg_* tools to read and write keys, pg_query for raw SQL \
and db_status to check connectivity.";

/// The main MCP server handler.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Explicitly owned storage backends.
    backends: Backends,

    /// Single entrypoint for tool calls.
    dispatcher: Arc<Dispatcher>,

    /// Health and status reports.
    health: Arc<HealthService>,

    /// Tool router for the rmcp handler.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Open the configured backends and build the server.
    ///
    /// Failing to open the embedded store is fatal. The networked store is
    /// attached whenever it is configured; an unreachable server only logs a
    /// warning here and surfaces later as per-call failures.
    pub async fn bootstrap(config: Config) -> super::Result<Self> {
        let sqlite = SqliteStore::open(&config.storage.sqlite_path)?;
        let mut backends = Backends::new(Arc::new(sqlite));
        match &config.storage.postgres {
            Some(pg_config) => {
                let store = PostgresStore::connect(pg_config);
                store.initialize().await;
                backends = backends.with_networked(Arc::new(store));
            }
            None => warn!("PostgreSQL not configured (POSTGRES_HOST unset); pg_* tools disabled"),
        }

        Ok(Self::new(config, backends))
    }

    /// Create a server over already constructed backends.
    pub fn new(config: Config, backends: Backends) -> Self {
        let config = Arc::new(config);
        let health = Arc::new(HealthService::new(backends.clone(), config.health.clone()));
        let dispatcher = Arc::new(Dispatcher::new(ToolContext::new(
            backends.clone(),
            health.clone(),
        )));

        Self {
            tool_router: build_tool_router::<Self>(dispatcher.clone()),
            config,
            backends,
            dispatcher,
            health,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn health(&self) -> &Arc<HealthService> {
        &self.health
    }

    /// The published manifest.
    pub fn describe(&self) -> Vec<ToolDescriptor> {
        self.dispatcher.describe()
    }

    /// List published tools in MCP shape (for the JSON-RPC endpoint).
    pub fn list_tools(&self) -> Vec<serde_json::Value> {
        self.dispatcher
            .registry()
            .get_all_tools()
            .into_iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect()
    }

    pub fn instructions(&self) -> &'static str {
        INSTRUCTIONS
    }

    /// Release backend resources.
    pub async fn shutdown(&self) {
        info!("Closing storage backends");
        self.backends.close().await;
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.config.server.name.clone(),
                version: self.config.server.version.clone(),
                ..Implementation::from_build_env()
            },
            ..Default::default()
        }
    }
}

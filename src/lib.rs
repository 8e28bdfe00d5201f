//! MCP key/value gateway library.
//!
//! Exposes a key/value store over MCP tools, backed by an embedded SQLite
//! file and an optional PostgreSQL server that may both be active at once.
//!
//! # Architecture
//!
//! - **core**: configuration, errors, logging, the server and its transports
//! - **domains**: business logic organized by bounded contexts
//!   - **storage**: record stores for both backends
//!   - **tools**: tool definitions, registry and the dispatcher
//!   - **health**: health and database status reports
//!
//! # Example
//!
//! ```rust,no_run
//! use kv_mcp_gateway::{core::McpServer, core::Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = McpServer::bootstrap(config).await?;
//!     // Start a transport...
//!     server.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};

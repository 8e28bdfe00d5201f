//! Transport layer for the gateway.
//!
//! This module provides different transport implementations:
//! - **HTTP**: legacy REST tool surface plus JSON-RPC over POST - feature: `http`
//! - **STDIO**: standard input/output MCP via rmcp - feature: `stdio`
//!
//! Each transport handles the connection lifecycle and delegates
//! tool calls to the shared dispatcher owned by [`McpServer`](crate::core::McpServer).

mod config;
mod error;
mod service;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "stdio")]
pub mod stdio;

pub use config::TransportConfig;
pub use error::{TransportError, TransportResult};
pub use service::{TransportService, shutdown_signal};

#[cfg(feature = "http")]
pub use config::HttpConfig;

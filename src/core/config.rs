//! Configuration management for the gateway.
//!
//! This module provides a centralized configuration structure populated from
//! environment variables (and a `.env` file, if present) over defaults.

use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure for the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Storage backends configuration.
    pub storage: StorageConfig,

    /// Health check behavior.
    pub health: HealthConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// Description published in the discovery manifest.
    pub description: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,

    /// Directory for rolling JSON log files. Console-only when unset.
    pub directory: Option<PathBuf>,
}

/// Storage configuration for both backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path of the embedded SQLite file.
    pub sqlite_path: PathBuf,

    /// Networked backend settings. `None` disables the backend entirely.
    pub postgres: Option<PostgresConfig>,
}

/// Connection settings for the networked PostgreSQL backend.
#[derive(Clone, Serialize, Deserialize)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,

    /// Upper bound on pooled connections.
    pub max_connections: u32,

    /// How long a call waits for a free connection before failing.
    pub acquire_timeout_ms: u64,

    /// Idle connections are closed after this many seconds.
    pub idle_timeout_secs: u64,
}

/// Custom Debug implementation to redact secrets from logs.
impl std::fmt::Debug for PostgresConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("database", &self.database)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout_ms", &self.acquire_timeout_ms)
            .field("idle_timeout_secs", &self.idle_timeout_secs)
            .finish()
    }
}

/// Health check configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Live-probe the networked backend on every health request.
    /// When false it is reported as configured and never degrades status.
    pub probe_networked: bool,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            database: "mcp_demo".to_string(),
            max_connections: 10,
            acquire_timeout_ms: 2000,
            idle_timeout_secs: 30,
        }
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            probe_networked: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "MCP Docker Database Server".to_string(),
                description: "MCP server with PostgreSQL and SQLite support".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                directory: None,
            },
            transport: TransportConfig::default(),
            storage: StorageConfig {
                sqlite_path: PathBuf::from("./data/mcp.db"),
                postgres: None,
            },
            health: HealthConfig::default(),
        }
    }
}

/// Read the first set variable among `names`.
fn env_any(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| std::env::var(name).ok())
}

/// Parse a variable, falling back to `default` when unset or malformed.
fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Interpret common truthy/falsy spellings.
pub(crate) fn env_flag(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(v) => !matches!(v.trim().to_lowercase().as_str(), "false" | "0" | "no" | "off"),
        Err(_) => default,
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Variables are prefixed with `MCP_` (e.g. `MCP_DB_PATH`); the legacy
    /// unprefixed names (`DB_PATH`, `LOG_LEVEL`) are honored as fallbacks.
    /// The PostgreSQL backend is enabled only when `POSTGRES_HOST` is set.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(description) = std::env::var("MCP_SERVER_DESCRIPTION") {
            config.server.description = description;
        }

        if let Some(level) = env_any(&["MCP_LOG_LEVEL", "LOG_LEVEL"]) {
            config.logging.level = level;
        }

        if let Ok(dir) = std::env::var("MCP_LOG_DIR") {
            config.logging.directory = Some(PathBuf::from(dir));
        }

        // Load transport configuration from environment
        config.transport = TransportConfig::from_env();

        if let Some(path) = env_any(&["MCP_DB_PATH", "DB_PATH"]) {
            config.storage.sqlite_path = PathBuf::from(path);
        }

        config.storage.postgres = PostgresConfig::from_env();

        config.health.probe_networked = env_flag("MCP_HEALTH_PROBE", true);

        config
    }
}

impl PostgresConfig {
    /// Load networked backend settings; `None` unless `POSTGRES_HOST` is set.
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("POSTGRES_HOST").ok()?;
        let defaults = Self::default();

        Some(Self {
            host,
            port: env_parse("POSTGRES_PORT", defaults.port),
            user: std::env::var("POSTGRES_USER").unwrap_or(defaults.user),
            password: std::env::var("POSTGRES_PASSWORD").unwrap_or(defaults.password),
            database: std::env::var("POSTGRES_DB").unwrap_or(defaults.database),
            max_connections: env_parse("MCP_PG_POOL_SIZE", defaults.max_connections),
            acquire_timeout_ms: env_parse(
                "MCP_PG_ACQUIRE_TIMEOUT_MS",
                defaults.acquire_timeout_ms,
            ),
            idle_timeout_secs: env_parse("MCP_PG_IDLE_TIMEOUT_SECS", defaults.idle_timeout_secs),
        })
    }
}

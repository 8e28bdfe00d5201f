//! Health and status aggregation over the configured backends.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::core::config::HealthConfig;
use crate::domains::storage::Backends;

/// Overall service status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

/// Networked backend state as shown in the health report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NetworkedState {
    #[serde(rename = "connected")]
    Connected,
    #[serde(rename = "disconnected")]
    Disconnected,
    #[serde(rename = "not configured")]
    NotConfigured,
    /// Configured but not probed (probing disabled).
    #[serde(rename = "configured")]
    Configured,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthDatabases {
    pub sqlite: &'static str,
    pub postgresql: NetworkedState,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub version: &'static str,
    pub databases: HealthDatabases,
}

#[derive(Debug, Clone, Serialize)]
pub struct SqliteStatus {
    pub connected: bool,
    pub path: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NetworkedStatus {
    pub configured: bool,
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Detailed per-backend report of `GET /databases` and `db_status`.
#[derive(Debug, Clone, Serialize)]
pub struct DatabasesReport {
    pub sqlite: SqliteStatus,
    pub postgresql: NetworkedStatus,
}

/// Health service - probes backends on demand. Holds no mutable state.
#[derive(Debug, Clone)]
pub struct HealthService {
    backends: Backends,
    config: HealthConfig,
}

impl HealthService {
    pub fn new(backends: Backends, config: HealthConfig) -> Self {
        Self { backends, config }
    }

    /// Composite health.
    ///
    /// The embedded store is always reported available. The networked store is
    /// live-probed when configured (and probing is enabled); the service is
    /// degraded only when that probe fails.
    pub async fn health(&self) -> HealthReport {
        let postgresql = match self.backends.networked() {
            None => NetworkedState::NotConfigured,
            Some(_) if !self.config.probe_networked => NetworkedState::Configured,
            Some(store) => match store.ping().await {
                Ok(()) => NetworkedState::Connected,
                Err(e) => {
                    warn!("Networked backend health probe failed: {}", e);
                    NetworkedState::Disconnected
                }
            },
        };

        let status = if postgresql == NetworkedState::Disconnected {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };
        debug!("Health: {:?} (postgresql: {:?})", status, postgresql);

        HealthReport {
            status,
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION"),
            databases: HealthDatabases {
                sqlite: "available",
                postgresql,
            },
        }
    }

    /// Detailed status including non-secret connection parameters.
    ///
    /// Always probes the networked store when configured, regardless of the
    /// health probe setting.
    pub async fn databases(&self) -> DatabasesReport {
        let sqlite = SqliteStatus {
            connected: true,
            path: self.backends.embedded().location(),
        };

        let postgresql = match self.backends.networked() {
            None => NetworkedStatus {
                error: Some("PostgreSQL not configured".to_string()),
                ..Default::default()
            },
            Some(store) => {
                let info = store.connection_info();
                let probe = store.ping().await;
                NetworkedStatus {
                    configured: true,
                    connected: probe.is_ok(),
                    host: Some(info.host),
                    port: Some(info.port),
                    database: Some(info.database),
                    error: probe.err().map(|e| e.to_string()),
                }
            }
        };

        DatabasesReport { sqlite, postgresql }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::storage::SqliteStore;
    use crate::domains::storage::testing::MemoryNetworkedStore;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn service(
        networked: Option<MemoryNetworkedStore>,
        probe_networked: bool,
    ) -> (TempDir, HealthService) {
        let dir = TempDir::new().unwrap();
        let sqlite = SqliteStore::open(dir.path().join("health.db")).unwrap();
        let mut backends = Backends::new(Arc::new(sqlite));
        if let Some(store) = networked {
            backends = backends.with_networked(Arc::new(store));
        }
        (dir, HealthService::new(backends, HealthConfig { probe_networked }))
    }

    #[tokio::test]
    async fn test_healthy_without_networked() {
        let (_dir, service) = service(None, true);
        let report = service.health().await;
        assert_eq!(report.status, HealthStatus::Healthy);
        assert_eq!(report.databases.postgresql, NetworkedState::NotConfigured);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["databases"]["sqlite"], "available");
        assert_eq!(json["databases"]["postgresql"], "not configured");
    }

    #[tokio::test]
    async fn test_degraded_when_unreachable() {
        let (_dir, service) = service(Some(MemoryNetworkedStore::unreachable()), true);
        let report = service.health().await;
        assert_eq!(report.status, HealthStatus::Degraded);
        assert_eq!(report.databases.sqlite, "available");
        assert_eq!(report.databases.postgresql, NetworkedState::Disconnected);
    }

    #[tokio::test]
    async fn test_connected_when_reachable() {
        let (_dir, service) = service(Some(MemoryNetworkedStore::reachable()), true);
        let report = service.health().await;
        assert_eq!(report.status, HealthStatus::Healthy);
        assert_eq!(report.databases.postgresql, NetworkedState::Connected);
    }

    #[tokio::test]
    async fn test_probe_disabled_never_degrades() {
        let (_dir, service) = service(Some(MemoryNetworkedStore::unreachable()), false);
        let report = service.health().await;
        assert_eq!(report.status, HealthStatus::Healthy);
        assert_eq!(report.databases.postgresql, NetworkedState::Configured);
    }

    #[tokio::test]
    async fn test_databases_report() {
        let (_dir, service) = service(Some(MemoryNetworkedStore::unreachable()), false);
        let report = service.databases().await;
        assert!(report.sqlite.connected);
        assert!(report.sqlite.path.ends_with("health.db"));
        assert!(report.postgresql.configured);
        assert!(!report.postgresql.connected);
        assert!(report.postgresql.error.is_some());
        assert!(report.postgresql.host.is_some());
    }

    #[tokio::test]
    async fn test_databases_report_unconfigured() {
        let (_dir, service) = service(None, true);
        let json = serde_json::to_value(service.databases().await).unwrap();
        assert_eq!(json["postgresql"]["configured"], false);
        assert_eq!(json["postgresql"]["error"], "PostgreSQL not configured");
        assert!(json["postgresql"].get("host").is_none());
    }
}

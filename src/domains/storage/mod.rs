//! Storage domain module.
//!
//! Two interchangeable record stores hold the same flat key/value table:
//!
//! - `sqlite.rs` - embedded single-file store, always available
//! - `postgres.rs` - networked relational store behind a connection pool,
//!   present only when connection settings are supplied
//!
//! Both implement [`RecordStore`]. The networked store additionally implements
//! [`NetworkedStore`] (raw queries, liveness probe, pool shutdown). Handles are
//! constructed once at startup and injected through [`Backends`].

mod error;
pub mod postgres;
pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub use error::{StoreError, StoreResult};
pub use postgres::PostgresStore;
pub use sqlite::SqliteStore;

/// Identity of the backend that served a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Embedded single-file store.
    Sqlite,
    /// Networked relational store.
    Postgresql,
    /// Composite operations touching every configured backend.
    All,
}

impl Backend {
    /// Wire label used in envelopes and status reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Postgresql => "postgresql",
            Self::All => "all",
        }
    }

    /// Human-readable engine name used in messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Sqlite => "SQLite",
            Self::Postgresql => "PostgreSQL",
            Self::All => "all databases",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A stored key/value pair. `key` is the sole identity within one backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub key: String,
    /// `None` only for a NULL written to the networked table out of band.
    pub value: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of a raw passthrough query.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryOutput {
    /// Returned rows, one JSON object per row keyed by column name.
    pub rows: Vec<serde_json::Value>,
    /// Rows returned or affected, as reported by the server.
    pub row_count: u64,
}

/// Connection parameters safe to expose in status reports (no credentials).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionInfo {
    pub host: String,
    pub port: u16,
    pub database: String,
}

/// The four-operation key/value contract shared by both backends.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Which backend this store is.
    fn backend(&self) -> Backend;

    /// Where the data lives (file path or host), for status reports.
    fn location(&self) -> String;

    /// Fetch a record, `None` when the key is absent.
    async fn get(&self, key: &str) -> StoreResult<Option<Record>>;

    /// Insert or replace the value for `key`, refreshing `updated_at`.
    async fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove `key`. Returns whether a row was actually removed.
    async fn delete(&self, key: &str) -> StoreResult<bool>;

    /// Keys in ascending lexicographic order, optionally filtered by a
    /// case-sensitive substring.
    async fn list(&self, pattern: Option<&str>) -> StoreResult<Vec<String>>;
}

/// Extra capabilities of the optional networked backend.
#[async_trait]
pub trait NetworkedStore: RecordStore {
    /// Unrestricted passthrough query. Not validated, not sandboxed.
    async fn raw_query(&self, sql: &str, params: &[serde_json::Value]) -> StoreResult<QueryOutput>;

    /// Trivial round trip used by health checks.
    async fn ping(&self) -> StoreResult<()>;

    /// Non-secret connection parameters.
    fn connection_info(&self) -> ConnectionInfo;

    /// Release pooled connections.
    async fn close(&self);
}

/// The set of backends available to the dispatcher.
///
/// The embedded store is mandatory; the networked store is `None` when no
/// connection settings were supplied.
#[derive(Clone)]
pub struct Backends {
    embedded: Arc<dyn RecordStore>,
    networked: Option<Arc<dyn NetworkedStore>>,
}

impl Backends {
    /// Create a backend set with only the embedded store.
    pub fn new(embedded: Arc<dyn RecordStore>) -> Self {
        Self {
            embedded,
            networked: None,
        }
    }

    /// Attach a networked store.
    pub fn with_networked(mut self, networked: Arc<dyn NetworkedStore>) -> Self {
        self.networked = Some(networked);
        self
    }

    /// The embedded store.
    pub fn embedded(&self) -> &Arc<dyn RecordStore> {
        &self.embedded
    }

    /// The networked store, if configured.
    pub fn networked(&self) -> Option<&Arc<dyn NetworkedStore>> {
        self.networked.as_ref()
    }

    /// Whether the networked store is configured.
    pub fn has_networked(&self) -> bool {
        self.networked.is_some()
    }

    /// Release backend resources. Safe to call more than once.
    pub async fn close(&self) {
        if let Some(networked) = &self.networked {
            networked.close().await;
        }
    }
}

impl fmt::Debug for Backends {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backends")
            .field("embedded", &self.embedded.location())
            .field(
                "networked",
                &self.networked.as_ref().map(|n| n.location()),
            )
            .finish()
    }
}

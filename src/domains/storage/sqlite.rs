//! Embedded record store on a single SQLite file.
//!
//! rusqlite is synchronous, so every operation hops onto the blocking pool via
//! `spawn_blocking` and serializes on one shared connection. Each upsert is a
//! single statement, so contention shows up as latency only.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument};

use super::{Backend, Record, RecordStore, StoreError, StoreResult};

const SCHEMA: &str = r#"
    PRAGMA journal_mode=WAL;
    PRAGMA synchronous=NORMAL;

    CREATE TABLE IF NOT EXISTS kv_store (
      key TEXT PRIMARY KEY,
      value TEXT NOT NULL,
      created_at TEXT NOT NULL,
      updated_at TEXT NOT NULL
    );
"#;

/// SQLite-backed [`RecordStore`].
#[derive(Clone)]
pub struct SqliteStore {
    path: PathBuf,
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (creating if needed) the store file and its schema.
    ///
    /// Idempotent: safe to call on every startup against an existing file.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::io(Backend::Sqlite, "open", None, format!("{}: {e}", parent.display()))
            })?;
        }

        let conn = Connection::open(&path).map_err(|e| open_error(&path, e))?;
        conn.execute_batch(SCHEMA)
            .map_err(|e| open_error(&path, e))?;

        info!("SQLite store ready at {}", path.display());

        Ok(Self {
            path,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, operation: &'static str, key: Option<&str>, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let conn = self.conn.clone();
        let owned_key = key.map(str::to_string);
        let result = tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| "connection mutex poisoned".to_string())?;
            f(&guard).map_err(|e| e.to_string())
        })
        .await;

        match result {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(message)) => Err(StoreError::io(
                Backend::Sqlite,
                operation,
                owned_key.as_deref(),
                message,
            )),
            Err(join) => Err(StoreError::io(
                Backend::Sqlite,
                operation,
                owned_key.as_deref(),
                format!("join error: {join}"),
            )),
        }
    }
}

fn open_error(path: &Path, err: rusqlite::Error) -> StoreError {
    StoreError::io(
        Backend::Sqlite,
        "open",
        None,
        format!("{}: {err}", path.display()),
    )
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored timestamp; a malformed one is a read failure for `key`.
fn parse_timestamp(key: &str, raw: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            StoreError::io(
                Backend::Sqlite,
                "get",
                Some(key),
                format!("malformed timestamp '{raw}': {e}"),
            )
        })
}

#[async_trait]
impl RecordStore for SqliteStore {
    fn backend(&self) -> Backend {
        Backend::Sqlite
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }

    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> StoreResult<Option<Record>> {
        let k = key.to_string();
        let row = self
            .with_conn("get", Some(key), move |conn| {
                conn.query_row(
                    "SELECT key, value, created_at, updated_at FROM kv_store WHERE key = ?1",
                    params![k],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, String>(3)?,
                        ))
                    },
                )
                .optional()
            })
            .await?;

        row.map(|(key, value, created_at, updated_at)| {
            Ok(Record {
                created_at: parse_timestamp(&key, &created_at)?,
                updated_at: parse_timestamp(&key, &updated_at)?,
                value: Some(value),
                key,
            })
        })
        .transpose()
    }

    #[instrument(skip(self, value))]
    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let (k, v) = (key.to_string(), value.to_string());
        let now = now_timestamp();
        self.with_conn("set", Some(key), move |conn| {
            conn.execute(
                "INSERT INTO kv_store (key, value, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?3)
                 ON CONFLICT(key) DO UPDATE SET
                   value = excluded.value,
                   updated_at = excluded.updated_at",
                params![k, v, now],
            )
        })
        .await?;
        debug!("SQLite set '{}'", key);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> StoreResult<bool> {
        let k = key.to_string();
        let removed = self
            .with_conn("delete", Some(key), move |conn| {
                conn.execute("DELETE FROM kv_store WHERE key = ?1", params![k])
            })
            .await?;
        Ok(removed > 0)
    }

    #[instrument(skip(self))]
    async fn list(&self, pattern: Option<&str>) -> StoreResult<Vec<String>> {
        let pattern = pattern.map(str::to_string);
        self.with_conn("list", None, move |conn| {
            // instr() is a case-sensitive substring match, unlike LIKE.
            let mut stmt = conn.prepare(
                "SELECT key FROM kv_store
                 WHERE ?1 IS NULL OR instr(key, ?1) > 0
                 ORDER BY key",
            )?;
            let keys = stmt
                .query_map(params![pattern], |row| row.get::<_, String>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(keys)
        })
        .await
    }
}

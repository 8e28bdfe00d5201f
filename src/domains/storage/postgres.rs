//! Networked record store on PostgreSQL.
//!
//! The pool is created lazily: constructing the store never touches the
//! network, so a configured-but-unreachable server only shows up as
//! per-call connectivity errors. Calls beyond the pool size queue for a
//! connection until the acquisition timeout elapses.
//!
//! Raw queries with parameters go through a server-side `PREPARE`/`EXECUTE`
//! pair: every parameter is sent as an untyped literal and the server coerces
//! it to the type it infers for the placeholder, so `created_at > $1` accepts
//! `"2000-01-01"` and `id = $1` accepts `"1"`. Results come back in text
//! format, which lets any column type decode to at least its text form.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use futures::TryStreamExt;
use serde_json::{Map, Value};
use sqlx::postgres::{PgConnectOptions, PgConnection, PgPool, PgPoolOptions, PgRow};
use sqlx::{Column, Either, Postgres, Row, TypeInfo};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

use super::{
    Backend, ConnectionInfo, NetworkedStore, QueryOutput, Record, RecordStore, StoreError,
    StoreResult,
};
use crate::core::config::PostgresConfig;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS mcp_data (
      id SERIAL PRIMARY KEY,
      key VARCHAR(255) UNIQUE NOT NULL,
      value TEXT,
      data_type VARCHAR(50) DEFAULT 'string',
      created_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP,
      updated_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP
    )
"#;

/// PostgreSQL-backed [`NetworkedStore`].
pub struct PostgresStore {
    pool: PgPool,
    info: ConnectionInfo,
    schema: OnceCell<()>,
    statements: AtomicU64,
}

impl PostgresStore {
    /// Build the store and its lazy connection pool.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn connect(config: &PostgresConfig) -> Self {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_millis(config.acquire_timeout_ms))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .connect_lazy_with(options);

        info!(
            "PostgreSQL pool configured for {}:{}/{} (max {} connections)",
            config.host, config.port, config.database, config.max_connections
        );

        Self {
            pool,
            info: ConnectionInfo {
                host: config.host.clone(),
                port: config.port,
                database: config.database.clone(),
            },
            schema: OnceCell::new(),
            statements: AtomicU64::new(0),
        }
    }

    /// Create the table if it does not exist yet.
    ///
    /// Succeeds at most once per store; failures are retried on the next call.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        self.init_schema()
            .await
            .map_err(|e| io_error("init", None, e))
    }

    async fn init_schema(&self) -> Result<(), sqlx::Error> {
        self.schema
            .get_or_try_init(|| async {
                sqlx::query(SCHEMA).execute(&self.pool).await?;
                info!("PostgreSQL tables initialized");
                Ok::<(), sqlx::Error>(())
            })
            .await
            .map(|_| ())
    }

    /// Try to create the schema at startup, logging instead of failing.
    pub async fn initialize(&self) {
        if let Err(e) = self.ensure_schema().await {
            warn!("PostgreSQL initialization failed: {}", e);
        }
    }
}

fn io_error(operation: &'static str, key: Option<&str>, err: sqlx::Error) -> StoreError {
    StoreError::io(Backend::Postgresql, operation, key, err.to_string())
}

fn query_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db) => StoreError::query(db.message()),
        other => io_error("query", None, other),
    }
}

/// Render a JSON parameter as an untyped SQL literal.
///
/// Scalars become quoted literals, arrays become array literals and objects
/// become their JSON text. `null` is a bare `NULL`.
fn param_literal(value: &Value) -> StoreResult<String> {
    let text = match value {
        Value::Null => return Ok("NULL".to_string()),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => array_literal(items),
        Value::Object(_) => value.to_string(),
    };
    quote_literal(&text)
}

fn quote_literal(text: &str) -> StoreResult<String> {
    if text.contains('\0') {
        return Err(StoreError::query(
            "invalid parameter: text cannot contain NUL characters",
        ));
    }
    Ok(format!("E'{}'", text.replace('\\', "\\\\").replace('\'', "''")))
}

fn array_literal(items: &[Value]) -> String {
    let elements: Vec<String> = items
        .iter()
        .map(|item| match item {
            Value::Null => "NULL".to_string(),
            Value::Array(nested) => array_literal(nested),
            Value::String(s) => quote_element(s),
            Value::Object(_) => quote_element(&item.to_string()),
            scalar => scalar.to_string(),
        })
        .collect();
    format!("{{{}}}", elements.join(","))
}

fn quote_element(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

/// `EXECUTE name(...)` for a prepared raw query.
fn execute_statement(name: &str, params: &[Value]) -> StoreResult<String> {
    let literals = params
        .iter()
        .map(param_literal)
        .collect::<StoreResult<Vec<_>>>()?;
    Ok(format!("EXECUTE {name}({})", literals.join(", ")))
}

/// Run one `sql` statement over the simple query protocol; boxed so the
/// `raw_query` future stays `Send` under sqlx's `Executor` lifetimes.
fn execute_raw(
    conn: &mut PgConnection,
    sql: String,
) -> futures::future::BoxFuture<'_, Result<sqlx::postgres::PgQueryResult, sqlx::Error>> {
    Box::pin(async move { sqlx::Executor::execute(conn, sqlx::raw_sql(&sql)).await })
}

/// Run `sql` over the simple query protocol and collect every result set.
async fn collect_output(conn: &mut PgConnection, sql: &str) -> StoreResult<QueryOutput> {
    let mut output = QueryOutput::default();
    let mut stream = sqlx::raw_sql(sql).fetch_many(conn);
    while let Some(item) = stream.try_next().await.map_err(query_error)? {
        match item {
            Either::Left(result) => output.row_count += result.rows_affected(),
            Either::Right(row) => output.rows.push(row_to_json(&row)?),
        }
    }
    Ok(output)
}

fn row_to_json(row: &PgRow) -> StoreResult<Value> {
    let mut object = Map::new();
    for column in row.columns() {
        let value = decode_column(row, column.ordinal(), column.type_info().name())
            .map_err(|e| StoreError::query(format!("column '{}': {e}", column.name())))?;
        object.insert(column.name().to_string(), value);
    }
    Ok(Value::Object(object))
}

fn decode_column(row: &PgRow, index: usize, type_name: &str) -> Result<Value, String> {
    fn get<'r, T>(row: &'r PgRow, index: usize) -> Result<Option<T>, String>
    where
        T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
    {
        row.try_get::<Option<T>, _>(index).map_err(|e| e.to_string())
    }

    let value = match type_name {
        "BOOL" => get::<bool>(row, index)?.map(Value::from),
        "INT2" => get::<i16>(row, index)?.map(Value::from),
        "INT4" => get::<i32>(row, index)?.map(Value::from),
        "INT8" => get::<i64>(row, index)?.map(Value::from),
        "FLOAT4" => get::<f32>(row, index)?.map(Value::from),
        "FLOAT8" => get::<f64>(row, index)?.map(Value::from),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => get::<String>(row, index)?.map(Value::from),
        "JSON" | "JSONB" => get::<Value>(row, index)?,
        "TIMESTAMPTZ" => get::<DateTime<Utc>>(row, index)?.map(|t| Value::from(t.to_rfc3339())),
        "TIMESTAMP" => get::<NaiveDateTime>(row, index)?
            .map(|t| Value::from(t.format("%Y-%m-%dT%H:%M:%S%.f").to_string())),
        "DATE" => get::<NaiveDate>(row, index)?.map(|d| Value::from(d.to_string())),
        "VOID" => None,
        // Text format: NUMERIC, UUID, arrays and the rest keep their text form.
        _ => row
            .try_get_unchecked::<Option<String>, _>(index)
            .map_err(|e| e.to_string())?
            .map(Value::from),
    };
    Ok(value.unwrap_or(Value::Null))
}

#[async_trait]
impl RecordStore for PostgresStore {
    fn backend(&self) -> Backend {
        Backend::Postgresql
    }

    fn location(&self) -> String {
        format!("{}:{}/{}", self.info.host, self.info.port, self.info.database)
    }

    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> StoreResult<Option<Record>> {
        self.init_schema()
            .await
            .map_err(|e| io_error("get", Some(key), e))?;
        let row: Option<(String, Option<String>, DateTime<Utc>, DateTime<Utc>)> =
            sqlx::query_as(
                "SELECT key, value, created_at::timestamptz, updated_at::timestamptz
                 FROM mcp_data WHERE key = $1",
            )
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| io_error("get", Some(key), e))?;

        Ok(row.map(|(key, value, created_at, updated_at)| Record {
            key,
            value,
            created_at,
            updated_at,
        }))
    }

    #[instrument(skip(self, value))]
    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.init_schema()
            .await
            .map_err(|e| io_error("set", Some(key), e))?;
        sqlx::query(
            "INSERT INTO mcp_data (key, value, updated_at)
             VALUES ($1, $2, CURRENT_TIMESTAMP)
             ON CONFLICT (key)
             DO UPDATE SET value = EXCLUDED.value, updated_at = CURRENT_TIMESTAMP",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| io_error("set", Some(key), e))?;
        debug!("PostgreSQL set '{}'", key);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> StoreResult<bool> {
        self.init_schema()
            .await
            .map_err(|e| io_error("delete", Some(key), e))?;
        let result = sqlx::query("DELETE FROM mcp_data WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| io_error("delete", Some(key), e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn list(&self, pattern: Option<&str>) -> StoreResult<Vec<String>> {
        self.init_schema()
            .await
            .map_err(|e| io_error("list", None, e))?;
        sqlx::query_scalar(
            r#"SELECT key FROM mcp_data
               WHERE $1::text IS NULL OR strpos(key, $1) > 0
               ORDER BY key COLLATE "C""#,
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| io_error("list", None, e))
    }
}

#[async_trait]
impl NetworkedStore for PostgresStore {
    #[instrument(skip(self, params), fields(params = params.len()))]
    async fn raw_query(&self, sql: &str, params: &[Value]) -> StoreResult<QueryOutput> {
        self.init_schema().await.map_err(query_error)?;
        let mut conn = self.pool.acquire().await.map_err(query_error)?;

        let output = if params.is_empty() {
            collect_output(&mut conn, sql).await?
        } else {
            let name = format!(
                "mcp_raw_{}",
                self.statements.fetch_add(1, Ordering::Relaxed)
            );
            execute_raw(&mut conn, format!("PREPARE {name} AS {sql}"))
                .await
                .map_err(query_error)?;

            let output = match execute_statement(&name, params) {
                Ok(statement) => collect_output(&mut conn, &statement).await,
                Err(e) => Err(e),
            };

            if let Err(e) = execute_raw(&mut conn, format!("DEALLOCATE {name}")).await {
                warn!("Failed to deallocate {}: {}", name, e);
            }
            output?
        };

        debug!("PostgreSQL query returned {} rows", output.rows.len());
        Ok(output)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT NOW()")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| io_error("ping", None, e))
    }

    fn connection_info(&self) -> ConnectionInfo {
        self.info.clone()
    }

    async fn close(&self) {
        if !self.pool.is_closed() {
            info!("Closing PostgreSQL pool");
            self.pool.close().await;
        }
    }
}

//! Shared parameter and result types for the key/value tools.
//!
//! `get` and `set` behave identically on both backends apart from the store
//! they run against, so the execution lives here.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domains::storage::RecordStore;
use crate::domains::tools::ToolError;
use crate::domains::tools::handlers::{ToolData, require_key, to_data};

/// Parameters of tools addressing a single key.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct KeyParams {
    /// Data key.
    pub key: String,
}

/// Parameters of the `set` tools.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct KeyValueParams {
    /// Data key.
    pub key: String,

    /// Value to store.
    pub value: String,
}

/// Result of a `get` tool.
#[derive(Debug, Serialize)]
pub struct GetResult {
    pub key: String,
    pub value: Option<String>,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Result of a `set` tool.
#[derive(Debug, Serialize)]
pub struct SetResult {
    pub message: String,
    pub key: String,
}

/// Look up one key on `store`.
pub async fn execute_get<S: RecordStore + ?Sized>(
    tool: &str,
    store: &S,
    params: KeyParams,
) -> Result<ToolData, ToolError> {
    require_key(tool, &params.key)?;

    let record = store.get(&params.key).await?;
    info!(
        "{} '{}' -> {}",
        tool,
        params.key,
        if record.is_some() { "found" } else { "absent" }
    );

    let result = match record {
        Some(record) => GetResult {
            key: record.key,
            value: record.value,
            found: true,
            created_at: Some(record.created_at),
            updated_at: Some(record.updated_at),
        },
        None => GetResult {
            key: params.key,
            value: None,
            found: false,
            created_at: None,
            updated_at: None,
        },
    };
    Ok(to_data(&result))
}

/// Upsert one key on `store`.
pub async fn execute_set<S: RecordStore + ?Sized>(
    tool: &str,
    store: &S,
    params: KeyValueParams,
) -> Result<ToolData, ToolError> {
    require_key(tool, &params.key)?;

    store.set(&params.key, &params.value).await?;
    info!("{} '{}' stored", tool, params.key);

    Ok(to_data(&SetResult {
        message: format!("Data stored in {}", store.backend()),
        key: params.key,
    }))
}

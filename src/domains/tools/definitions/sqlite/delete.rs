//! Delete tool definition for the embedded store.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::domains::storage::Backend;
use crate::domains::tools::definitions::common::KeyParams;
use crate::domains::tools::handlers::{
    ToolContext, ToolData, ToolDescriptor, ToolHandler, parse_params, require_key, to_data,
};
use crate::domains::tools::ToolError;

/// Result of a delete operation.
#[derive(Debug, Serialize)]
struct DeleteResult {
    key: String,
    /// False when the key was already absent.
    deleted: bool,
}

/// Delete tool - removes one key from SQLite.
pub struct SqliteDeleteTool;

impl SqliteDeleteTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "sqlite_delete";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Delete key from SQLite";
}

#[async_trait::async_trait]
impl ToolHandler for SqliteDeleteTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new::<KeyParams>(Self::NAME, Self::DESCRIPTION)
    }

    fn backend(&self) -> Backend {
        Backend::Sqlite
    }

    async fn execute(&self, params: Map<String, Value>, ctx: &ToolContext) -> Result<ToolData, ToolError> {
        let params: KeyParams = parse_params(Self::NAME, params)?;
        require_key(Self::NAME, &params.key)?;

        let deleted = ctx.backends.embedded().delete(&params.key).await?;
        info!("{} '{}' deleted={}", Self::NAME, params.key, deleted);

        Ok(to_data(&DeleteResult {
            key: params.key,
            deleted,
        }))
    }
}

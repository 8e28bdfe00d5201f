//! Set tool definition for the embedded store.

use serde_json::{Map, Value};

use crate::domains::storage::Backend;
use crate::domains::tools::definitions::common::{KeyValueParams, execute_set};
use crate::domains::tools::handlers::{
    ToolContext, ToolData, ToolDescriptor, ToolHandler, parse_params,
};
use crate::domains::tools::ToolError;

/// Set tool - upserts one key/value pair into SQLite.
pub struct SqliteSetTool;

impl SqliteSetTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "sqlite_set";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Store data in SQLite";
}

#[async_trait::async_trait]
impl ToolHandler for SqliteSetTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new::<KeyValueParams>(Self::NAME, Self::DESCRIPTION)
    }

    fn backend(&self) -> Backend {
        Backend::Sqlite
    }

    async fn execute(&self, params: Map<String, Value>, ctx: &ToolContext) -> Result<ToolData, ToolError> {
        let params: KeyValueParams = parse_params(Self::NAME, params)?;
        execute_set(Self::NAME, &**ctx.backends.embedded(), params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::definitions::common::testing::{context, params};
    use serde_json::json;

    #[tokio::test]
    async fn test_set_then_overwrite() {
        let (_dir, ctx) = context(None);

        let data = SqliteSetTool
            .execute(params(json!({ "key": "k1", "value": "v1" })), &ctx)
            .await
            .unwrap();
        assert_eq!(data["key"], "k1");
        assert_eq!(data["message"], "Data stored in SQLite");

        SqliteSetTool
            .execute(params(json!({ "key": "k1", "value": "v2" })), &ctx)
            .await
            .unwrap();
        let record = ctx.backends.embedded().get("k1").await.unwrap().unwrap();
        assert_eq!(record.value.as_deref(), Some("v2"));
    }
}

//! Get tool definition for the embedded store.

use serde_json::{Map, Value};

use crate::domains::storage::Backend;
use crate::domains::tools::definitions::common::{KeyParams, execute_get};
use crate::domains::tools::handlers::{
    ToolContext, ToolData, ToolDescriptor, ToolHandler, parse_params,
};
use crate::domains::tools::ToolError;

/// Get tool - reads one value from SQLite.
pub struct SqliteGetTool;

impl SqliteGetTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "sqlite_get";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Retrieve data from SQLite";
}

#[async_trait::async_trait]
impl ToolHandler for SqliteGetTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new::<KeyParams>(Self::NAME, Self::DESCRIPTION)
    }

    fn backend(&self) -> Backend {
        Backend::Sqlite
    }

    async fn execute(&self, params: Map<String, Value>, ctx: &ToolContext) -> Result<ToolData, ToolError> {
        let params: KeyParams = parse_params(Self::NAME, params)?;
        execute_get(Self::NAME, &**ctx.backends.embedded(), params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::definitions::common::testing::{context, params};
    use serde_json::json;

    #[tokio::test]
    async fn test_get_missing_key_is_null() {
        let (_dir, ctx) = context(None);
        let data = SqliteGetTool
            .execute(params(json!({ "key": "nope" })), &ctx)
            .await
            .unwrap();
        assert_eq!(data["value"], Value::Null);
        assert_eq!(data["found"], false);
        assert!(data.get("updated_at").is_none());
    }

    #[tokio::test]
    async fn test_get_existing_key() {
        let (_dir, ctx) = context(None);
        ctx.backends.embedded().set("k1", "v1").await.unwrap();

        let data = SqliteGetTool
            .execute(params(json!({ "key": "k1" })), &ctx)
            .await
            .unwrap();
        assert_eq!(data["key"], "k1");
        assert_eq!(data["value"], "v1");
        assert_eq!(data["found"], true);
        assert!(data.contains_key("created_at"));
    }

    #[tokio::test]
    async fn test_get_empty_key_rejected() {
        let (_dir, ctx) = context(None);
        let err = SqliteGetTool
            .execute(params(json!({ "key": "" })), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidParameters { .. }));
    }
}

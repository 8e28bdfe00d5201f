//! List tool definition for the embedded store.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::domains::storage::Backend;
use crate::domains::tools::handlers::{
    ToolContext, ToolData, ToolDescriptor, ToolHandler, parse_params, to_data,
};
use crate::domains::tools::ToolError;

/// Parameters for the list tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct SqliteListParams {
    /// Case-sensitive substring the key must contain.
    #[serde(default)]
    pub pattern: Option<String>,
}

#[derive(Debug, Serialize)]
struct ListResult {
    keys: Vec<String>,
    count: usize,
}

/// List tool - enumerates SQLite keys in ascending order.
pub struct SqliteListTool;

impl SqliteListTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "sqlite_list";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "List SQLite keys";
}

#[async_trait::async_trait]
impl ToolHandler for SqliteListTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new::<SqliteListParams>(Self::NAME, Self::DESCRIPTION)
    }

    fn backend(&self) -> Backend {
        Backend::Sqlite
    }

    async fn execute(&self, params: Map<String, Value>, ctx: &ToolContext) -> Result<ToolData, ToolError> {
        let params: SqliteListParams = parse_params(Self::NAME, params)?;
        // An empty filter matches everything, same as no filter.
        let pattern = params.pattern.as_deref().filter(|p| !p.is_empty());

        let keys = ctx.backends.embedded().list(pattern).await?;
        info!("{} pattern={:?} -> {} keys", Self::NAME, pattern, keys.len());

        Ok(to_data(&ListResult {
            count: keys.len(),
            keys,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::definitions::common::testing::{context, params};
    use serde_json::json;

    #[tokio::test]
    async fn test_list_with_and_without_pattern() {
        let (_dir, ctx) = context(None);
        for key in ["a1", "b2", "a3"] {
            ctx.backends.embedded().set(key, "x").await.unwrap();
        }

        let all = SqliteListTool.execute(params(json!({})), &ctx).await.unwrap();
        assert_eq!(all["keys"], json!(["a1", "a3", "b2"]));
        assert_eq!(all["count"], 3);

        let filtered = SqliteListTool
            .execute(params(json!({ "pattern": "a" })), &ctx)
            .await
            .unwrap();
        assert_eq!(filtered["keys"], json!(["a1", "a3"]));

        let empty_pattern = SqliteListTool
            .execute(params(json!({ "pattern": "" })), &ctx)
            .await
            .unwrap();
        assert_eq!(empty_pattern["count"], 3);
    }
}

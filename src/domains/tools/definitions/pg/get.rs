//! Get tool definition for the networked store.

use serde_json::{Map, Value};

use crate::domains::storage::Backend;
use crate::domains::tools::definitions::common::{KeyParams, execute_get};
use crate::domains::tools::handlers::{
    ToolContext, ToolData, ToolDescriptor, ToolHandler, parse_params,
};
use crate::domains::tools::ToolError;

/// Get tool - reads one value from PostgreSQL.
pub struct PgGetTool;

impl PgGetTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "pg_get";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Retrieve data from PostgreSQL";
}

#[async_trait::async_trait]
impl ToolHandler for PgGetTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new::<KeyParams>(Self::NAME, Self::DESCRIPTION)
    }

    fn backend(&self) -> Backend {
        Backend::Postgresql
    }

    async fn execute(&self, params: Map<String, Value>, ctx: &ToolContext) -> Result<ToolData, ToolError> {
        let params: KeyParams = parse_params(Self::NAME, params)?;
        let store = ctx.networked()?;
        execute_get(Self::NAME, &**store, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::storage::testing::MemoryNetworkedStore;
    use crate::domains::tools::definitions::common::testing::{context, params};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_not_configured() {
        let (_dir, ctx) = context(None);
        let err = PgGetTool
            .execute(params(json!({ "key": "x" })), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::BackendNotConfigured(Backend::Postgresql)));
    }

    #[tokio::test]
    async fn test_reads_networked_store_only() {
        let (_dir, ctx) = context(Some(Arc::new(MemoryNetworkedStore::reachable())));
        ctx.backends.embedded().set("k", "embedded").await.unwrap();

        let data = PgGetTool
            .execute(params(json!({ "key": "k" })), &ctx)
            .await
            .unwrap();
        assert_eq!(data["found"], false);
        assert_eq!(data["value"], Value::Null);
    }

    #[tokio::test]
    async fn test_null_value_stays_null() {
        let store = MemoryNetworkedStore::reachable();
        let now = chrono::Utc::now();
        store.seed(crate::domains::storage::Record {
            key: "k".to_string(),
            value: None,
            created_at: now,
            updated_at: now,
        });
        let (_dir, ctx) = context(Some(Arc::new(store)));

        let data = PgGetTool
            .execute(params(json!({ "key": "k" })), &ctx)
            .await
            .unwrap();
        assert_eq!(data["found"], true);
        assert_eq!(data["value"], Value::Null);
    }

    #[tokio::test]
    async fn test_invalid_params_checked_before_backend() {
        let (_dir, ctx) = context(None);
        let err = PgGetTool.execute(params(json!({})), &ctx).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidParameters { .. }));
    }
}

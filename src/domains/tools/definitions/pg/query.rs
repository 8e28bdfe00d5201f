//! Raw query tool definition for the networked store.
//!
//! An unrestricted passthrough: the SQL is neither validated nor sandboxed.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::domains::storage::Backend;
use crate::domains::tools::handlers::{
    ToolContext, ToolData, ToolDescriptor, ToolHandler, parse_params, to_data,
};
use crate::domains::tools::ToolError;

/// Parameters for the query tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct PgQueryParams {
    /// SQL text with `$1`-style placeholders.
    pub query: String,

    /// Positional parameters. Each is sent untyped and coerced by the server
    /// to the type it infers for the placeholder.
    #[serde(default)]
    pub params: Option<Vec<Value>>,
}

/// Query tool - executes arbitrary SQL on PostgreSQL.
pub struct PgQueryTool;

impl PgQueryTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "pg_query";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Execute SQL query on PostgreSQL";
}

#[async_trait::async_trait]
impl ToolHandler for PgQueryTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new::<PgQueryParams>(Self::NAME, Self::DESCRIPTION)
    }

    fn backend(&self) -> Backend {
        Backend::Postgresql
    }

    async fn execute(&self, params: Map<String, Value>, ctx: &ToolContext) -> Result<ToolData, ToolError> {
        let params: PgQueryParams = parse_params(Self::NAME, params)?;
        if params.query.trim().is_empty() {
            return Err(ToolError::invalid_parameters(
                Self::NAME,
                "parameter 'query' must not be empty",
            ));
        }
        let store = ctx.networked()?;
        let bound = params.params.unwrap_or_default();

        info!("{} with {} params", Self::NAME, bound.len());
        let output = store
            .raw_query(&params.query, &bound)
            .await
            .inspect_err(|e| warn!("{} failed: {}", Self::NAME, e))?;

        Ok(to_data(&output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::storage::testing::MemoryNetworkedStore;
    use crate::domains::tools::ErrorKind;
    use crate::domains::tools::definitions::common::testing::{context, params};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_query_passes_sql_and_params_through() {
        let (_dir, ctx) = context(Some(Arc::new(MemoryNetworkedStore::reachable())));
        let data = PgQueryTool
            .execute(
                params(json!({ "query": "SELECT $1::int", "params": [7] })),
                &ctx,
            )
            .await
            .unwrap();
        assert_eq!(data["row_count"], 1);
        assert_eq!(data["rows"][0]["sql"], "SELECT $1::int");
        assert_eq!(data["rows"][0]["params"], json!([7]));
    }

    #[tokio::test]
    async fn test_malformed_query_is_query_error() {
        let (_dir, ctx) = context(Some(Arc::new(MemoryNetworkedStore::reachable())));
        let err = PgQueryTool
            .execute(params(json!({ "query": "NOPE" })), &ctx)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::QueryError);
    }

    #[tokio::test]
    async fn test_blank_query_rejected() {
        let (_dir, ctx) = context(Some(Arc::new(MemoryNetworkedStore::reachable())));
        let err = PgQueryTool
            .execute(params(json!({ "query": "   " })), &ctx)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameters);
    }

    #[tokio::test]
    async fn test_null_params_means_none() {
        let (_dir, ctx) = context(Some(Arc::new(MemoryNetworkedStore::reachable())));
        let data = PgQueryTool
            .execute(params(json!({ "query": "SELECT 1", "params": null })), &ctx)
            .await
            .unwrap();
        assert_eq!(data["rows"][0]["params"], json!([]));
    }
}

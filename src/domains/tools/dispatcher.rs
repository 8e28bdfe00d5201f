//! Dispatcher - the single entrypoint for tool invocations.
//!
//! Every transport (REST, JSON-RPC, stdio) routes calls through
//! [`Dispatcher::invoke`], which resolves the tool in the registry, runs the
//! handler once and wraps the outcome in an envelope. No backend error
//! escapes unwrapped.

use serde_json::{Map, Value};
use tracing::{info, instrument, warn};

use super::envelope::{ToolFailure, ToolSuccess};
use super::error::ToolError;
use super::handlers::{ToolContext, ToolDescriptor};
use super::registry::ToolRegistry;

/// Dispatcher - owns the registry and the handler context.
pub struct Dispatcher {
    registry: ToolRegistry,
    ctx: ToolContext,
}

impl Dispatcher {
    /// Create a dispatcher; the registry follows the context's backends.
    pub fn new(ctx: ToolContext) -> Self {
        Self {
            registry: ToolRegistry::new(ctx.backends.has_networked()),
            ctx,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// The published manifest.
    pub fn describe(&self) -> Vec<ToolDescriptor> {
        self.registry.describe()
    }

    /// Invoke `tool` with `params`. A single attempt, never retried.
    ///
    /// `params` may be `null` (treated as `{}`); any other non-object value
    /// is rejected as invalid parameters.
    #[instrument(skip(self, params))]
    pub async fn invoke(&self, tool: &str, params: Value) -> Result<ToolSuccess, ToolFailure> {
        let fail = |err: ToolError| {
            warn!("Tool call '{}' failed: {}", tool, err);
            ToolFailure::new(Some(tool), &err)
        };

        if tool.is_empty() {
            return Err(fail(ToolError::MissingTool));
        }

        let handler = self
            .registry
            .resolve(tool)
            .ok_or_else(|| fail(ToolError::UnknownTool(tool.to_string())))?;

        let params = match params {
            Value::Null => Map::new(),
            Value::Object(map) => map,
            other => {
                return Err(fail(ToolError::invalid_parameters(
                    tool,
                    format!("parameters must be an object, got {}", json_type(&other)),
                )));
            }
        };

        let data = handler.execute(params, &self.ctx).await.map_err(fail)?;
        info!("Tool call '{}' succeeded on {}", tool, handler.backend());

        Ok(ToolSuccess {
            tool: tool.to_string(),
            backend: handler.backend(),
            data,
        })
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::storage::testing::MemoryNetworkedStore;
    use crate::domains::tools::ErrorKind;
    use crate::domains::tools::definitions::common::testing::context;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn dispatcher(networked: bool) -> (TempDir, Dispatcher) {
        let store = networked.then(|| {
            Arc::new(MemoryNetworkedStore::reachable())
                as Arc<dyn crate::domains::storage::NetworkedStore>
        });
        let (dir, ctx) = context(store);
        (dir, Dispatcher::new(ctx))
    }

    #[tokio::test]
    async fn test_missing_tool() {
        let (_dir, dispatcher) = dispatcher(false);
        let failure = dispatcher.invoke("", json!({})).await.unwrap_err();
        assert_eq!(failure.kind, ErrorKind::MissingTool);
        assert!(failure.tool.is_none());
    }

    #[tokio::test]
    async fn test_unknown_tool_names_the_tool() {
        let (_dir, dispatcher) = dispatcher(false);
        let failure = dispatcher
            .invoke("nonexistent_tool", json!({}))
            .await
            .unwrap_err();
        assert!(!failure.success);
        assert_eq!(failure.kind, ErrorKind::UnknownTool);
        assert!(failure.error.contains("nonexistent_tool"));
        assert_eq!(failure.tool.as_deref(), Some("nonexistent_tool"));
    }

    #[tokio::test]
    async fn test_backend_isolation() {
        let (_dir, dispatcher) = dispatcher(false);
        let failure = dispatcher
            .invoke("pg_get", json!({ "key": "x" }))
            .await
            .unwrap_err();
        assert_eq!(failure.kind, ErrorKind::BackendNotConfigured);

        let success = dispatcher
            .invoke("sqlite_get", json!({ "key": "x" }))
            .await
            .unwrap();
        let json = success.into_json();
        assert_eq!(json["success"], true);
        assert_eq!(json["database"], "sqlite");
        assert_eq!(json["found"], false);
    }

    #[tokio::test]
    async fn test_invalid_parameters_before_backend_access() {
        let (_dir, dispatcher) = dispatcher(false);
        let failure = dispatcher
            .invoke("sqlite_set", json!({ "key": "k" }))
            .await
            .unwrap_err();
        assert_eq!(failure.kind, ErrorKind::InvalidParameters);
        assert!(failure.error.contains("`value`"));

        let failure = dispatcher
            .invoke("sqlite_get", json!({ "key": 42 }))
            .await
            .unwrap_err();
        assert_eq!(failure.kind, ErrorKind::InvalidParameters);

        // Parameters are checked before the missing backend is reported.
        let failure = dispatcher.invoke("pg_set", json!({ "key": "k" })).await.unwrap_err();
        assert_eq!(failure.kind, ErrorKind::InvalidParameters);

        let failure = dispatcher
            .invoke("sqlite_get", json!(["k"]))
            .await
            .unwrap_err();
        assert_eq!(failure.kind, ErrorKind::InvalidParameters);
    }

    #[tokio::test]
    async fn test_null_params_treated_as_empty() {
        let (_dir, dispatcher) = dispatcher(false);
        let success = dispatcher.invoke("sqlite_list", Value::Null).await.unwrap();
        assert_eq!(success.into_json()["count"], 0);
    }

    #[tokio::test]
    async fn test_key_value_lifecycle() {
        let (_dir, dispatcher) = dispatcher(false);

        let set = dispatcher
            .invoke("sqlite_set", json!({ "key": "k1", "value": "v1" }))
            .await
            .unwrap()
            .into_json();
        assert_eq!(set["key"], "k1");

        let get = dispatcher
            .invoke("sqlite_get", json!({ "key": "k1" }))
            .await
            .unwrap()
            .into_json();
        assert_eq!(get["value"], "v1");

        let list = dispatcher
            .invoke("sqlite_list", json!({ "pattern": "k" }))
            .await
            .unwrap()
            .into_json();
        assert_eq!(list["keys"], json!(["k1"]));

        let delete = dispatcher
            .invoke("sqlite_delete", json!({ "key": "k1" }))
            .await
            .unwrap()
            .into_json();
        assert_eq!(delete["deleted"], true);

        let get = dispatcher
            .invoke("sqlite_get", json!({ "key": "k1" }))
            .await
            .unwrap()
            .into_json();
        assert_eq!(get["value"], Value::Null);
    }

    #[tokio::test]
    async fn test_same_key_independent_per_backend() {
        let (_dir, dispatcher) = dispatcher(true);
        dispatcher
            .invoke("sqlite_set", json!({ "key": "k", "value": "embedded" }))
            .await
            .unwrap();
        dispatcher
            .invoke("pg_set", json!({ "key": "k", "value": "networked" }))
            .await
            .unwrap();

        let pg = dispatcher.invoke("pg_get", json!({ "key": "k" })).await.unwrap();
        assert_eq!(pg.backend, crate::domains::storage::Backend::Postgresql);
        assert_eq!(pg.into_json()["value"], "networked");

        let sqlite = dispatcher
            .invoke("sqlite_get", json!({ "key": "k" }))
            .await
            .unwrap();
        assert_eq!(sqlite.into_json()["value"], "embedded");
    }

    #[tokio::test]
    async fn test_status_reports_all() {
        let (_dir, dispatcher) = dispatcher(true);
        let json = dispatcher
            .invoke("db_status", json!({}))
            .await
            .unwrap()
            .into_json();
        assert_eq!(json["database"], "all");
        assert_eq!(json["databases"]["postgresql"]["connected"], true);
    }
}

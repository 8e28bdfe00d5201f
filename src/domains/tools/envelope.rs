//! Uniform success/failure envelopes wrapped around every tool invocation.

use serde::Serialize;
use serde_json::{Map, Value};

use super::error::{ErrorKind, ToolError};
use super::handlers::ToolData;
use crate::domains::storage::Backend;

/// A successful invocation: the handler's result plus which backend served it.
#[derive(Debug, Clone)]
pub struct ToolSuccess {
    pub tool: String,
    pub backend: Backend,
    pub data: ToolData,
}

impl ToolSuccess {
    /// Flatten into `{...data, success: true, database}`.
    pub fn into_json(self) -> Value {
        let mut map = self.data;
        map.insert("success".to_string(), Value::Bool(true));
        map.insert(
            "database".to_string(),
            Value::String(self.backend.as_str().to_string()),
        );
        Value::Object(map)
    }
}

/// A failed invocation. Every error reaching the transport is one of these.
#[derive(Debug, Clone, Serialize)]
pub struct ToolFailure {
    pub success: bool,
    pub error: String,
    pub tool: Option<String>,
    pub kind: ErrorKind,
}

impl ToolFailure {
    pub fn new(tool: Option<&str>, error: &ToolError) -> Self {
        Self {
            success: false,
            error: error.to_string(),
            tool: tool.filter(|t| !t.is_empty()).map(str::to_string),
            kind: error.kind(),
        }
    }

    /// Whether the caller is at fault (HTTP 400 rather than 500).
    pub fn is_client_error(&self) -> bool {
        self.kind.is_client_error()
    }

    pub fn into_json(self) -> Value {
        serde_json::to_value(&self).unwrap_or_else(|_| {
            let mut map = Map::new();
            map.insert("success".to_string(), Value::Bool(false));
            map.insert("error".to_string(), Value::String(self.error));
            Value::Object(map)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope() {
        let mut data = Map::new();
        data.insert("key".to_string(), json!("k1"));
        let json = ToolSuccess {
            tool: "sqlite_set".to_string(),
            backend: Backend::Sqlite,
            data,
        }
        .into_json();
        assert_eq!(json, json!({ "key": "k1", "success": true, "database": "sqlite" }));
    }

    #[test]
    fn test_failure_envelope() {
        let err = ToolError::UnknownTool("nope".to_string());
        let json = ToolFailure::new(Some("nope"), &err).into_json();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Unknown tool: nope");
        assert_eq!(json["tool"], "nope");
        assert_eq!(json["kind"], "unknown_tool");
    }

    #[test]
    fn test_failure_without_tool_name() {
        let failure = ToolFailure::new(Some(""), &ToolError::MissingTool);
        assert!(failure.is_client_error());
        assert_eq!(failure.into_json()["tool"], Value::Null);
    }

    #[test]
    fn test_backend_failure_is_server_error() {
        let failure = ToolFailure::new(
            Some("pg_get"),
            &ToolError::BackendNotConfigured(Backend::Postgresql),
        );
        assert!(!failure.is_client_error());
        assert_eq!(failure.error, "PostgreSQL not configured");
    }
}

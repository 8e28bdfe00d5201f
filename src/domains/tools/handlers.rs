//! Tool handler trait and the context handlers run against.
//!
//! Every tool in `definitions/` is a unit struct implementing [`ToolHandler`].
//! A handler's parameter struct derives `JsonSchema` for the manifest and
//! `Deserialize` for [`parse_params`], so the published schema and the
//! accepted input cannot drift apart. Handlers return the raw result object;
//! the dispatcher adds the envelope.

use rmcp::handler::server::tool::cached_schema_for_type;
use rmcp::model::JsonObject;
use schemars::JsonSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;

use super::error::ToolError;
use crate::domains::health::HealthService;
use crate::domains::storage::{Backend, Backends, NetworkedStore};

/// Everything a handler may touch. Built once at startup.
#[derive(Clone)]
pub struct ToolContext {
    pub backends: Backends,
    pub health: Arc<HealthService>,
}

impl ToolContext {
    pub fn new(backends: Backends, health: Arc<HealthService>) -> Self {
        Self { backends, health }
    }

    /// The networked store, or `BackendNotConfigured`.
    pub fn networked(&self) -> Result<&Arc<dyn NetworkedStore>, ToolError> {
        self.backends
            .networked()
            .ok_or(ToolError::BackendNotConfigured(Backend::Postgresql))
    }
}

/// Raw result object produced by a handler.
pub type ToolData = Map<String, Value>;

/// Published description of one tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    /// JSON Schema generated from the tool's parameter struct.
    pub input_schema: Arc<JsonObject>,
}

impl ToolDescriptor {
    /// Describe a tool whose parameters deserialize into `P`.
    pub fn new<P: JsonSchema + 'static>(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            input_schema: cached_schema_for_type::<P>(),
        }
    }
}

/// A named, schema-described operation bound to one backend.
#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync {
    /// Published name, description and input schema.
    fn descriptor(&self) -> ToolDescriptor;

    /// The backend that serves this tool.
    fn backend(&self) -> Backend;

    /// Execute the tool. `params` is always a JSON object.
    async fn execute(&self, params: Map<String, Value>, ctx: &ToolContext) -> Result<ToolData, ToolError>;
}

/// Deserialize parameters into the tool's typed struct.
///
/// Missing required fields, `null` for a required field and type mismatches
/// all surface as `InvalidParameters`; undeclared fields are ignored.
pub fn parse_params<T: DeserializeOwned>(tool: &str, params: Map<String, Value>) -> Result<T, ToolError> {
    serde_json::from_value(Value::Object(params))
        .map_err(|e| ToolError::invalid_parameters(tool, e.to_string()))
}

/// Reject empty keys; `key` is the record identity.
pub fn require_key(tool: &str, key: &str) -> Result<(), ToolError> {
    if key.is_empty() {
        Err(ToolError::invalid_parameters(tool, "parameter 'key' must not be empty"))
    } else {
        Ok(())
    }
}

/// Convert a serializable result into a [`ToolData`] object.
pub fn to_data<T: serde::Serialize>(value: &T) -> ToolData {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            let mut map = Map::new();
            map.insert("result".to_string(), other);
            map
        }
        Err(e) => {
            let mut map = Map::new();
            map.insert("result".to_string(), Value::String(e.to_string()));
            map
        }
    }
}

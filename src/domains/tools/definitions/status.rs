//! Composite database status tool.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domains::storage::Backend;
use crate::domains::tools::handlers::{ToolContext, ToolData, ToolDescriptor, ToolHandler};
use crate::domains::tools::ToolError;

/// The status tool takes no parameters.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct DbStatusParams {}

/// Status tool - reports connectivity of every backend.
pub struct DbStatusTool;

impl DbStatusTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "db_status";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Check database connection status";
}

#[async_trait::async_trait]
impl ToolHandler for DbStatusTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new::<DbStatusParams>(Self::NAME, Self::DESCRIPTION)
    }

    fn backend(&self) -> Backend {
        Backend::All
    }

    async fn execute(&self, _params: Map<String, Value>, ctx: &ToolContext) -> Result<ToolData, ToolError> {
        let report = ctx.health.databases().await;
        let mut data = Map::new();
        data.insert(
            "databases".to_string(),
            serde_json::to_value(report).unwrap_or(Value::Null),
        );
        Ok(data)
    }
}

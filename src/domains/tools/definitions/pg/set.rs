//! Set tool definition for the networked store.

use serde_json::{Map, Value};

use crate::domains::storage::Backend;
use crate::domains::tools::definitions::common::{KeyValueParams, execute_set};
use crate::domains::tools::handlers::{
    ToolContext, ToolData, ToolDescriptor, ToolHandler, parse_params,
};
use crate::domains::tools::ToolError;

/// Set tool - upserts one key/value pair into PostgreSQL.
pub struct PgSetTool;

impl PgSetTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "pg_set";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Store data in PostgreSQL";
}

#[async_trait::async_trait]
impl ToolHandler for PgSetTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new::<KeyValueParams>(Self::NAME, Self::DESCRIPTION)
    }

    fn backend(&self) -> Backend {
        Backend::Postgresql
    }

    async fn execute(&self, params: Map<String, Value>, ctx: &ToolContext) -> Result<ToolData, ToolError> {
        let params: KeyValueParams = parse_params(Self::NAME, params)?;
        let store = ctx.networked()?;
        execute_set(Self::NAME, &**store, params).await
    }
}

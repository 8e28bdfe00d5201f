//! Tool Registry - the static set of tools and their descriptors.
//!
//! Built once at startup from which backends are configured and never
//! mutated afterwards. It provides:
//! - `describe()`, the ordered manifest (networked tools first, when present)
//! - `resolve()`, name to handler lookup

use std::sync::Arc;

use rmcp::model::Tool;

use super::definitions::{
    DbStatusTool, PgGetTool, PgQueryTool, PgSetTool, SqliteDeleteTool, SqliteGetTool,
    SqliteListTool, SqliteSetTool,
};
use super::handlers::{ToolDescriptor, ToolHandler};

// ============================================================================
// Tool Registry
// ============================================================================

/// Tool registry - maps tool names to handlers.
///
/// Networked-backend tools always resolve so that calling them without a
/// configured backend yields `BackendNotConfigured` rather than
/// `UnknownTool`; they are only listed in the manifest when configured.
pub struct ToolRegistry {
    networked: Vec<Arc<dyn ToolHandler>>,
    embedded: Vec<Arc<dyn ToolHandler>>,
    networked_configured: bool,
}

impl ToolRegistry {
    /// Create the registry for the given backend availability.
    pub fn new(networked_configured: bool) -> Self {
        Self {
            networked: vec![
                Arc::new(PgSetTool),
                Arc::new(PgGetTool),
                Arc::new(PgQueryTool),
            ],
            embedded: vec![
                Arc::new(SqliteGetTool),
                Arc::new(SqliteSetTool),
                Arc::new(SqliteDeleteTool),
                Arc::new(SqliteListTool),
                Arc::new(DbStatusTool),
            ],
            networked_configured,
        }
    }

    /// Handlers published in the manifest, in manifest order.
    pub fn handlers(&self) -> impl Iterator<Item = &Arc<dyn ToolHandler>> {
        let networked: &[Arc<dyn ToolHandler>] = if self.networked_configured {
            &self.networked
        } else {
            &[]
        };
        networked.iter().chain(self.embedded.iter())
    }

    /// The manifest: one descriptor per published tool.
    pub fn describe(&self) -> Vec<ToolDescriptor> {
        self.handlers().map(|h| h.descriptor()).collect()
    }

    /// Published tool names, in manifest order.
    pub fn tool_names(&self) -> Vec<&'static str> {
        self.describe().into_iter().map(|d| d.name).collect()
    }

    /// Look up a handler by name.
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.networked
            .iter()
            .chain(self.embedded.iter())
            .find(|h| h.descriptor().name == name)
            .cloned()
    }

    /// Get all published tools as rmcp Tool models.
    ///
    /// Both the JSON-RPC endpoint and the stdio router list tools from here.
    pub fn get_all_tools(&self) -> Vec<Tool> {
        self.describe().iter().map(to_tool).collect()
    }
}

/// Convert a descriptor into the rmcp `Tool` model.
pub fn to_tool(descriptor: &ToolDescriptor) -> Tool {
    Tool {
        name: descriptor.name.into(),
        description: Some(descriptor.description.into()),
        input_schema: descriptor.input_schema.clone(),
        annotations: None,
        output_schema: None,
        icons: None,
        meta: None,
        title: None,
    }
}

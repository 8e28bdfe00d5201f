//! Tool Router - builds the rmcp ToolRouter from the dispatcher.
//!
//! Used by the stdio transport. Each published tool gets a dynamic route
//! that forwards to [`Dispatcher::invoke`], so stdio and HTTP share one
//! dispatch path.

use std::sync::Arc;

use futures::FutureExt;
use rmcp::handler::server::tool::{ToolCallContext, ToolRoute, ToolRouter};
use rmcp::model::{CallToolResult, Content};
use serde_json::Value;

use super::dispatcher::Dispatcher;
use super::envelope::{ToolFailure, ToolSuccess};
use super::registry::to_tool;

/// Build the tool router with every published tool.
pub fn build_tool_router<S>(dispatcher: Arc<Dispatcher>) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    dispatcher
        .describe()
        .iter()
        .fold(ToolRouter::new(), |router, descriptor| {
            router.with_route(create_route(descriptor.name, to_tool(descriptor), dispatcher.clone()))
        })
}

fn create_route<S>(
    name: &'static str,
    tool: rmcp::model::Tool,
    dispatcher: Arc<Dispatcher>,
) -> ToolRoute<S>
where
    S: Send + Sync + 'static,
{
    ToolRoute::new_dyn(tool, move |ctx: ToolCallContext<'_, S>| {
        let args = ctx.arguments.clone().map(Value::Object).unwrap_or(Value::Null);
        let dispatcher = dispatcher.clone();
        async move { Ok(to_call_result(dispatcher.invoke(name, args).await)) }.boxed()
    })
}

/// Render a dispatch outcome as an MCP tool result.
///
/// Failures are tool-level errors (`isError: true`), not protocol errors.
pub fn to_call_result(outcome: Result<ToolSuccess, ToolFailure>) -> CallToolResult {
    let (json, is_error) = match outcome {
        Ok(success) => (success.into_json(), false),
        Err(failure) => (failure.into_json(), true),
    };
    CallToolResult {
        content: vec![Content::text(json.to_string())],
        structured_content: Some(json),
        is_error: Some(is_error),
        meta: None,
    }
}

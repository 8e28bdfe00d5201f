//! Tools domain module.
//!
//! Tools are the named, schema-described operations clients invoke. Each
//! one is bound to a backend.
//!
//! ## Architecture
//!
//! - `definitions/` - Individual tool implementations (one file per tool)
//! - `handlers.rs` - Handler trait, descriptors and parameter parsing
//! - `registry.rs` - Static name -> handler table and manifest
//! - `dispatcher.rs` - Single invocation entrypoint with envelopes
//! - `router.rs` - rmcp ToolRouter for the stdio transport
//! - `error.rs` - Tool-specific error types
//!
//! ## Adding a New Tool
//!
//! 1. Create a new file in `definitions/` implementing [`ToolHandler`]
//! 2. Export it in `definitions/mod.rs`
//! 3. Add it to `ToolRegistry::new`
//!
//! The router, manifest and HTTP surface pick it up from the registry.

pub mod definitions;
mod dispatcher;
mod envelope;
mod error;
mod handlers;
mod registry;
pub mod router;

pub use dispatcher::Dispatcher;
pub use envelope::{ToolFailure, ToolSuccess};
pub use error::{ErrorKind, ToolError};
pub use handlers::*;
pub use registry::ToolRegistry;
pub use router::build_tool_router;

//! Tool-specific error types.

use serde::Serialize;
use thiserror::Error;

use crate::domains::storage::{Backend, StoreError};

/// Errors that can occur while dispatching a tool call.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The request did not name a tool.
    #[error("Missing tool parameter")]
    MissingTool,

    /// The request body could not be read as a call.
    #[error("Invalid request body: {0}")]
    InvalidRequest(String),

    /// The requested tool is not in the registry.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Parameters do not satisfy the tool's input schema.
    #[error("Invalid parameters for {tool}: {reason}")]
    InvalidParameters { tool: String, reason: String },

    /// A networked operation was requested but no connection is configured.
    #[error("{0} not configured")]
    BackendNotConfigured(Backend),

    /// The backend reported a failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Stable, machine-readable classification of a [`ToolError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingTool,
    InvalidRequest,
    UnknownTool,
    InvalidParameters,
    BackendNotConfigured,
    BackendIo,
    QueryError,
}

impl ErrorKind {
    /// Whether the caller is at fault (HTTP 400 rather than 500).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingTool | Self::InvalidRequest | Self::UnknownTool | Self::InvalidParameters
        )
    }
}

impl ToolError {
    /// Create a new "invalid parameters" error.
    pub fn invalid_parameters(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameters {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingTool => ErrorKind::MissingTool,
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::UnknownTool(_) => ErrorKind::UnknownTool,
            Self::InvalidParameters { .. } => ErrorKind::InvalidParameters,
            Self::BackendNotConfigured(_) => ErrorKind::BackendNotConfigured,
            Self::Store(StoreError::Io { .. }) => ErrorKind::BackendIo,
            Self::Store(StoreError::Query { .. }) => ErrorKind::QueryError,
        }
    }

    /// Whether the caller is at fault (as opposed to a backend failure).
    pub fn is_client_error(&self) -> bool {
        self.kind().is_client_error()
    }
}

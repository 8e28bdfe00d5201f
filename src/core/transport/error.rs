//! Transport error types.

use thiserror::Error;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Ways a transport can fail to start or stop abnormally.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP listener could not bind its address.
    #[error("Failed to bind to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP server stopped with an I/O error.
    #[error("HTTP server error: {0}")]
    Serve(#[source] std::io::Error),

    /// The stdio MCP handshake did not complete.
    #[error("MCP handshake failed: {0}")]
    Handshake(String),

    /// The stdio MCP session ended with an error.
    #[error("MCP session error: {0}")]
    Session(String),
}

impl TransportError {
    /// Create a bind error.
    pub fn bind(address: impl Into<String>, source: std::io::Error) -> Self {
        Self::Bind {
            address: address.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_bind_keeps_source() {
        let err = TransportError::bind(
            "127.0.0.1:1",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "Failed to bind to 127.0.0.1:1: denied");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_stdio_errors_name_the_phase() {
        assert_eq!(
            TransportError::Handshake("closed".into()).to_string(),
            "MCP handshake failed: closed"
        );
        assert_eq!(
            TransportError::Session("reset".into()).to_string(),
            "MCP session error: reset"
        );
    }
}

//! Error types and handling for the gateway.
//!
//! Only process-level failures reach this type: the embedded store failing
//! to open, or the transport failing to start or stopping abnormally.
//! Per-request tool failures are turned into envelopes by the dispatcher.

use thiserror::Error;

/// A specialized Result type for gateway operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the gateway.
#[derive(Debug, Error)]
pub enum Error {
    /// A storage backend failed, e.g. the embedded store could not be opened.
    #[error("Storage error: {0}")]
    Store(#[from] crate::domains::storage::StoreError),

    /// The transport failed to start or stopped abnormally.
    #[error("Transport error: {0}")]
    Transport(#[from] super::transport::TransportError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transport::TransportError;
    use crate::domains::storage::{Backend, StoreError};

    #[test]
    fn test_store_error_conversion() {
        let err: Error = StoreError::io(Backend::Sqlite, "open", None, "disk full").into();
        assert_eq!(err.to_string(), "Storage error: SQLite open failed: disk full");
    }

    #[test]
    fn test_transport_error_conversion() {
        let source = std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use");
        let err: Error = TransportError::bind("0.0.0.0:10000", source).into();
        assert_eq!(
            err.to_string(),
            "Transport error: Failed to bind to 0.0.0.0:10000: address in use"
        );
    }
}

//! Storage error types.

use thiserror::Error;

use super::Backend;

/// Result type for record store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The storage engine reported a fault (disk, constraint, connectivity).
    #[error("{backend} {operation} failed{}: {message}", key_suffix(.key))]
    Io {
        backend: Backend,
        operation: &'static str,
        key: Option<String>,
        message: String,
    },

    /// A raw query was rejected by the server.
    #[error("{backend} query failed: {message}")]
    Query { backend: Backend, message: String },
}

fn key_suffix(key: &Option<String>) -> String {
    match key {
        Some(key) => format!(" for key '{key}'"),
        None => String::new(),
    }
}

impl StoreError {
    /// Create a storage fault for `operation`, optionally naming the key.
    pub fn io(
        backend: Backend,
        operation: &'static str,
        key: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        Self::Io {
            backend,
            operation,
            key: key.map(str::to_string),
            message: message.into(),
        }
    }

    /// Create a query error on the networked backend.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            backend: Backend::Postgresql,
            message: message.into(),
        }
    }

    /// The backend that raised this error.
    pub fn backend(&self) -> Backend {
        match self {
            Self::Io { backend, .. } | Self::Query { backend, .. } => *backend,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_message_names_operation_and_key() {
        let err = StoreError::io(Backend::Sqlite, "get", Some("k1"), "disk I/O error");
        assert_eq!(
            err.to_string(),
            "SQLite get failed for key 'k1': disk I/O error"
        );
    }

    #[test]
    fn test_io_message_without_key() {
        let err = StoreError::io(Backend::Postgresql, "list", None, "pool timed out");
        assert_eq!(err.to_string(), "PostgreSQL list failed: pool timed out");
    }

    #[test]
    fn test_query_error_backend() {
        let err = StoreError::query("syntax error");
        assert_eq!(err.backend(), Backend::Postgresql);
        assert!(err.to_string().contains("syntax error"));
    }
}

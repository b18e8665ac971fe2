//! Storage error types for the document store backends.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Document store operation errors.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StorageError {
    /// Entity not found
    #[error("Entity not found: {entity_type} with id {entity_id}")]
    NotFound {
        entity_type: String,
        entity_id: String,
    },
    /// Path or key rejected before reaching the backend
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    /// A stored record did not match its schema
    #[error("Malformed record at {path}: {reason}")]
    Malformed { path: String, reason: String },
    /// The backend answered with a non-success status
    #[error("Backend returned {status}: {message}")]
    Backend { status: u16, message: String },
    /// A multi-path write stopped part way through
    #[error("Partial write: applied {applied:?}, failed at {failed}: {reason}")]
    PartialWrite {
        applied: Vec<String>,
        failed: String,
        reason: String,
    },
    /// Connection or transport error
    #[error("Connection error: {0}")]
    ConnectionError(String),
    /// General storage error
    #[error("Storage error: {0}")]
    Other(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Other(format!("JSON error: {}", err))
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Other(format!("I/O error: {}", err))
    }
}

impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => StorageError::Backend {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None => StorageError::ConnectionError(err.to_string()),
        }
    }
}

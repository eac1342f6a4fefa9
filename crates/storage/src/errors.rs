//! Storage-specific error types.
//!
//! These errors are internal to the storage layer and are converted to
//! `listwatch_core::errors::SnapshotError` before being returned to callers.

use listwatch_core::errors::SnapshotError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Query execution failed: {0}")]
    QueryFailed(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Connection lock poisoned")]
    LockPoisoned,

    #[error("Blocking task failed: {0}")]
    TaskFailed(String),
}

impl From<StorageError> for SnapshotError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::QueryFailed(e) => SnapshotError::Database(e.to_string()),
            StorageError::Io(e) => SnapshotError::Io(e),
            StorageError::Serialization(e) => SnapshotError::Serialization(e),
            StorageError::LockPoisoned => {
                SnapshotError::Database("connection lock poisoned".to_string())
            }
            StorageError::TaskFailed(e) => SnapshotError::Database(e),
        }
    }
}

impl From<tokio::task::JoinError> for StorageError {
    fn from(err: tokio::task::JoinError) -> Self {
        StorageError::TaskFailed(err.to_string())
    }
}

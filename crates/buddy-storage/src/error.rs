//! Storage errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage quota exceeded for {key}: {size} bytes exceeds limit of {limit}")]
    QuotaExceeded { key: String, size: usize, limit: usize },

    #[error("Cannot modify built-in tasks")]
    BuiltInTask,

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

//! Storage error types

use thiserror::Error;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors surfaced by the storage collaborator.
///
/// A missing record is not an error; reads return an empty result instead.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// Storage unreachable or authentication failed. Fatal; surfaced to the
    /// caller immediately, never retried at this layer.
    #[error("storage connection failed: {0}")]
    Connection(String),

    /// A write failed. The batched write protocol means no partial index
    /// state is left behind by a failed batch.
    #[error("write failed for {key}: {reason}")]
    Write { key: String, reason: String },

    /// Operation issued after the connection was released
    #[error("storage connection is closed")]
    Disconnected,
}

impl StorageError {
    /// Create a write error
    pub fn write(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Write {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

//! Record store error types

use thiserror::Error;

use crate::schema::SchemaError;
use crate::storage::StorageError;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by the record store.
///
/// A missing record is a `None` result, never an error.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The storage collaborator failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The model registry rejected the request
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// `save` was called on a record that carries no id
    #[error("record of type {model} carries no id; use create, or supply one")]
    MissingId { model: String },
}

//! Schema registry error types

use thiserror::Error;

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while building or consulting the model registry
#[derive(Debug, Clone, Error)]
pub enum SchemaError {
    /// No model with this name was registered
    #[error("unknown model: {0}")]
    UnknownModel(String),

    /// A model with this name was already registered
    #[error("model already defined: {0}")]
    ModelRedefined(String),

    /// A model definition file could not be read or parsed
    #[error("malformed model definition at {path}: {reason}")]
    MalformedDefinition { path: String, reason: String },
}

impl SchemaError {
    /// Create a malformed-definition error
    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedDefinition {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

//! Error types for the field schema

use thiserror::Error;

/// Result type for field schema operations
pub type Result<T> = std::result::Result<T, FieldsError>;

/// Errors that can occur while resolving or mutating a campaign's field schema
#[derive(Debug, Error)]
pub enum FieldsError {
    /// Field key absent from the collection the operation expects it in
    #[error("field not found: {key}")]
    NotFound { key: String },

    /// Operation is not allowed on this field (e.g. deleting a system field)
    #[error("invalid operation: {message}")]
    InvalidOperation { message: String },

    /// Key already used by a system or custom field
    #[error("duplicate field key: {key}")]
    DuplicateKey { key: String },

    /// Alias already claimed by another field definition
    #[error("alias '{alias}' is already used by field '{existing}'")]
    AliasCollision { alias: String, existing: String },

    /// Field definition failed validation
    #[error("invalid field '{key}': {message}")]
    InvalidField { key: String, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl FieldsError {
    /// Create a not found error
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Create an invalid operation error
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Create an invalid field error
    pub fn invalid_field(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidField {
            key: key.into(),
            message: message.into(),
        }
    }
}

//! Error types for the campaign settings service

use std::path::PathBuf;
use thiserror::Error;

use leadpipe_fields::FieldsError;

/// Result type for settings operations
pub type Result<T> = std::result::Result<T, SettingsError>;

/// Errors that can occur in settings operations
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Campaign not found
    #[error("campaign not found: {id}")]
    CampaignNotFound { id: String },

    /// Client not found
    #[error("client not found: {id}")]
    ClientNotFound { id: String },

    /// Duplicate ID
    #[error("duplicate {item_type} ID: {id}")]
    DuplicateId { item_type: String, id: String },

    /// Field schema rejected the change
    #[error(transparent)]
    Fields(#[from] FieldsError),

    /// Destructive change was not confirmed with the field's name and key
    #[error("confirmation does not match field '{key}' ({name})")]
    ConfirmationMismatch { key: String, name: String },

    /// Missing required field
    #[error("missing required field: {field}")]
    MissingField { field: String },

    /// Id cannot be used as a file name
    #[error("invalid {item_type} ID: {id:?}")]
    InvalidId { item_type: String, id: String },

    /// Another write to the same campaign is in flight
    #[error("campaign {id} is busy - another settings change is in progress")]
    LockBusy { id: String },

    /// Waited too long for another write to finish
    #[error("lock timeout after {elapsed_ms}ms")]
    LockTimeout { elapsed_ms: u64 },

    /// Persistence collaborator failed
    #[error("store error: {message}")]
    Store { message: String },

    /// Data directory missing or unusable
    #[error("data directory not initialized at {path}")]
    NotInitialized { path: PathBuf },

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SettingsError {
    /// Create a store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create a duplicate ID error
    pub fn duplicate_id(item_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::DuplicateId {
            item_type: item_type.into(),
            id: id.into(),
        }
    }

    /// Check if this is a retryable error
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::LockBusy { .. } | Self::LockTimeout { .. })
    }
}

impl From<figment::Error> for SettingsError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

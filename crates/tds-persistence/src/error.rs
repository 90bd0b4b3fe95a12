//! Persistence and store error types.
//!
//! All persistence operations return structured errors that provide
//! user-friendly messages and optional remediation hints.

use std::path::PathBuf;

use tds_model::ValidationError;
use thiserror::Error;

/// Persistence operation error.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// File I/O error.
    #[error("Failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The state document is not valid JSON or does not match the schema shape.
    #[error("Failed to parse state file: {path}")]
    Deserialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The state document parsed but violates a schema invariant.
    #[error("State file failed validation: {path}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },

    /// Serialization error.
    #[error("Failed to serialize application state")]
    Serialization {
        #[source]
        source: serde_json::Error,
    },

    /// Atomic write failed (temp file couldn't be renamed).
    #[error("Failed to complete save operation")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PersistenceError {
    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Io {
                operation, path, ..
            } => {
                format!("Could not {} the file at {}", operation, path.display())
            }
            Self::Deserialization { path, .. } => {
                format!(
                    "The state file at {} could not be read. It may be corrupted.",
                    path.display()
                )
            }
            Self::Invalid { path, source } => {
                format!(
                    "The state file at {} contains invalid data: {}",
                    path.display(),
                    source
                )
            }
            Self::Serialization { .. } => {
                "An error occurred while saving the application state.".to_string()
            }
            Self::AtomicWriteFailed { target_path, .. } => {
                format!(
                    "Could not save the file to {}. Please check disk space and permissions.",
                    target_path.display()
                )
            }
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Io { operation, .. } => {
                if *operation == "read" {
                    Some("Check that the file exists and you have permission to read it.".into())
                } else {
                    Some("Check that you have permission to write to this location.".into())
                }
            }
            Self::Deserialization { .. } | Self::Invalid { .. } => {
                Some("The backup copy will be used if it is intact.".into())
            }
            Self::Serialization { .. } => None,
            Self::AtomicWriteFailed { .. } => {
                Some("Free up disk space; changes are kept in memory until a save succeeds.".into())
            }
        }
    }

    /// Whether the error means the file does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}

/// Result type alias for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;

/// Error returned by store mutations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The proposed value was rejected; the state is unchanged.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No draft with the given id.
    #[error("draft {id} not found")]
    NotFound { id: u64 },

    /// An explicit persistence operation failed.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

//! Validation error types.

use thiserror::Error;

/// A proposed value violates the schema constraint of the field it targets.
///
/// Returned synchronously by every mutating operation; the state tree is
/// never touched when one of these is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The value does not match the field's format (GUID, email, domain...).
    #[error("{field}: {reason}")]
    InvalidFormat { field: &'static str, reason: String },

    /// A numeric value falls outside the allowed range.
    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// A text value exceeds its maximum length.
    #[error("{field} is too long ({len} characters, maximum {max})")]
    TooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    /// A required value was empty.
    #[error("{field} is required")]
    Required { field: &'static str },

    /// The field does not exist on the addressed provider.
    #[error("{provider} has no field '{field}'")]
    UnknownField {
        provider: &'static str,
        field: &'static str,
    },

    /// A whole-tree invariant does not hold (used when validating loaded documents).
    #[error("invariant violated: {0}")]
    Invariant(String),
}

impl ValidationError {
    pub(crate) fn format(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            field,
            reason: reason.into(),
        }
    }

    /// Name of the offending field, when the error is tied to one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidFormat { field, .. }
            | Self::OutOfRange { field, .. }
            | Self::TooLong { field, .. }
            | Self::Required { field }
            | Self::UnknownField { field, .. } => Some(field),
            Self::Invariant(_) => None,
        }
    }
}

/// Result type alias for validation.
pub type Result<T> = std::result::Result<T, ValidationError>;

//! Error types for generation.

use std::path::PathBuf;

use tds_model::ValidationError;
use tds_persistence::StoreError;
use thiserror::Error;

/// Error returned by a content provider call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ProviderError {
    /// The provider asked us to slow down (HTTP 429).
    #[error("rate limit exceeded")]
    RateLimited {
        /// Seconds suggested by the provider, if any.
        retry_after: Option<u64>,
    },

    /// The request timed out.
    #[error("request timed out")]
    Timeout,

    /// Connection-level failure.
    #[error("network error: {0}")]
    Network(String),

    /// The provider failed on its side (HTTP 5xx).
    #[error("provider error {status}: {message}")]
    Server { status: u16, message: String },

    /// The provider rejected the request (other HTTP 4xx).
    #[error("request rejected {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The response could not be turned into a subject and body.
    #[error("unusable response: {0}")]
    InvalidResponse(String),

    /// No API key configured.
    #[error("content provider is not configured")]
    NotConfigured,
}

impl ProviderError {
    /// Returns whether this error is potentially recoverable with a retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. }
                | Self::Timeout
                | Self::Network(_)
                | Self::Server { .. }
                | Self::InvalidResponse(_)
        )
    }

    /// Map an HTTP status and body to an error.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            429 => Self::RateLimited { retry_after: None },
            500..=599 => Self::Server { status, message },
            _ => Self::Rejected { status, message },
        }
    }

    /// Returns a user-friendly error message suitable for display in the UI.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::RateLimited { .. } => "The content provider is rate limiting requests.",
            Self::Timeout | Self::Network(_) => {
                "Could not reach the content provider. Please check your internet connection."
            }
            Self::Server { .. } => "The content provider is having problems. Try again later.",
            Self::Rejected { status: 401 | 403, .. } => {
                "The content provider rejected the API key."
            }
            Self::Rejected { .. } => "The content provider rejected the request.",
            Self::InvalidResponse(_) => "The content provider returned an unexpected response.",
            Self::NotConfigured => "Add a Claude API key before generating.",
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if let Some(status) = err.status() {
            Self::from_status(status.as_u16(), err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// A batch could not be started.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRequest {
    #[error("invalid batch size: {0}")]
    Count(#[source] ValidationError),

    #[error("invalid recipient: {0}")]
    Recipient(#[source] ValidationError),
}

/// One item of a batch failed. The batch continues.
#[derive(Debug, Error)]
pub enum ItemError {
    /// The provider kept failing, or failed with a non-retryable error.
    #[error("generation failed after {attempts} attempt(s): {source}")]
    Generation {
        attempts: u32,
        #[source]
        source: ProviderError,
    },

    /// The generated draft was refused by the store.
    #[error("could not store draft: {0}")]
    Store(#[from] StoreError),
}

/// Errors loading a category catalog.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    /// CSV file not found.
    #[error("Catalog file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read or parse the CSV file.
    #[error("Failed to read catalog {path}: {source}")]
    CsvRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The file held no usable rows.
    #[error("Catalog {path} has no categories")]
    Empty { path: PathBuf },
}

/// The batch task ended abnormally.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("batch task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert!(ProviderError::from_status(429, "slow down").is_retryable());
        assert!(ProviderError::from_status(529, "overloaded").is_retryable());
        assert!(!ProviderError::from_status(400, "bad prompt").is_retryable());
        assert!(!ProviderError::from_status(401, "bad key").is_retryable());
        assert!(!ProviderError::NotConfigured.is_retryable());
    }

    #[test]
    fn test_user_messages() {
        let err = ProviderError::from_status(401, "invalid x-api-key");
        assert!(err.user_message().contains("API key"));
        assert!(ProviderError::Timeout.user_message().contains("internet"));
    }
}

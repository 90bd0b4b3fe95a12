//! Content provider contract.

mod claude;
mod parse;
mod prompt;

use std::future::Future;

use tds_model::{Classification, QualityLevel};

use crate::error::ProviderError;
use crate::usage::TokenUsage;

pub use claude::{ClaudeConfig, ClaudeProvider};
pub use parse::parse_content;
pub use prompt::build_prompt;

/// One content request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRequest {
    pub classification: Classification,
    pub quality: QualityLevel,
    /// User instructions in custom mode.
    pub custom_prompt: Option<String>,
    /// 1-based position of the item and batch size.
    pub position: (u32, u32),
}

/// Generated subject and body, untagged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentResponse {
    pub subject: String,
    pub body: String,
    pub usage: Option<TokenUsage>,
}

/// External service producing ticket email content.
pub trait ContentProvider: Send + Sync + 'static {
    /// Generate one subject/body pair.
    ///
    /// Errors must be classified so that [`ProviderError::is_retryable`]
    /// tells transient failures apart from permanent ones.
    fn generate(
        &self,
        request: &ContentRequest,
    ) -> impl Future<Output = Result<ContentResponse, ProviderError>> + Send;
}

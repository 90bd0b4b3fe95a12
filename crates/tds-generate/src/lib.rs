//! Ticket email generation for Ticket Draft Studio.
//!
//! Runs batches of content requests against a [`ContentProvider`], one
//! background task per batch, and appends each generated draft to the
//! [`StateStore`](tds_persistence::StateStore) as it arrives.
//!
//! # Features
//!
//! - **Streaming events** in item order over a per-batch channel
//! - **Cooperative cancellation** that also abandons an in-flight call
//! - **Retries** with longer backoff for rate-limit responses
//! - **Call spacing** shared by every batch of an orchestrator
//! - **Preview mode** with provisional ids and explicit promotion
//!
//! # Example
//!
//! ```ignore
//! use tds_generate::{BatchRequest, ClaudeConfig, ClaudeProvider, Orchestrator, OrchestratorConfig};
//!
//! let provider = ClaudeProvider::new(&api_key, ClaudeConfig::default())?;
//! let orchestrator = Orchestrator::new(provider, store.clone(), OrchestratorConfig::default());
//! let mut batch = orchestrator.start_batch(BatchRequest::from_state(&store.snapshot()))?;
//! while let Some(event) = batch.next_event().await {
//!     println!("{event:?}");
//! }
//! let summary = batch.finish().await?;
//! ```
//!
//! # Architecture
//!
//! - `orchestrator.rs` - [`Orchestrator`] and the per-batch run loop
//! - `batch.rs` - Requests, events, [`BatchHandle`]
//! - `provider/` - Provider contract and the Claude implementation
//! - `distribution.rs` - Weighted classification plans
//! - `catalog.rs` - Category catalog (built-in or CSV)
//! - `rate_limit.rs` - Minimum call spacing
//! - `retry.rs` - Retry policy
//! - `usage.rs` - Token usage and cost estimate

mod batch;
mod catalog;
mod distribution;
mod error;
mod orchestrator;
pub mod provider;
mod rate_limit;
mod retry;
mod usage;

pub use batch::{
    BatchCanceller, BatchEvent, BatchHandle, BatchRequest, BatchState, BatchSummary,
    PREVIEW_COUNT, PreviewDraft,
};
pub use catalog::{Catalog, CategoryEntry};
pub use distribution::{Distributor, PRIORITY_WEIGHTS, TYPE_WEIGHTS, plan_custom};
pub use error::{BatchError, CatalogError, InvalidRequest, ItemError, ProviderError};
pub use orchestrator::{Orchestrator, OrchestratorConfig};
pub use provider::{ClaudeConfig, ClaudeProvider, ContentProvider, ContentRequest, ContentResponse};
pub use rate_limit::RateLimiter;
pub use retry::RetryPolicy;
pub use usage::{COST_PER_1M_INPUT_TOKENS, COST_PER_1M_OUTPUT_TOKENS, TokenUsage};

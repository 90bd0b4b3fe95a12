//! Batch requests, events and the caller's handle on a running batch.

use std::sync::Arc;
use std::time::Duration;

use tds_model::{ApplicationState, DraftArtifact, NewDraft, QualityLevel};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::{BatchError, ItemError};
use crate::usage::TokenUsage;

/// Number of items generated in preview mode.
pub const PREVIEW_COUNT: u32 = 3;

/// Parameters for one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    pub count: u32,
    pub quality: QualityLevel,
    /// Pause between items, on top of the orchestrator's call spacing.
    pub wait_time: Duration,
    /// `Some` selects custom mode.
    pub custom_prompt: Option<String>,
    pub recipient: String,
    /// Preview drafts are not appended to the store.
    pub preview: bool,
    /// Seed for the guided classification plan.
    pub seed: Option<u64>,
}

impl BatchRequest {
    /// Build a request from the persisted generation settings.
    pub fn from_state(state: &ApplicationState) -> Self {
        let settings = &state.generation;
        Self {
            count: settings.email_count,
            quality: settings.quality,
            wait_time: Duration::from_millis(settings.wait_time_ms),
            custom_prompt: settings
                .uses_custom_prompt()
                .then(|| settings.custom_prompt.clone()),
            recipient: state.connections.microsoft.recipient_email.clone(),
            preview: false,
            seed: None,
        }
    }

    /// Switch to preview mode. The count is fixed.
    #[must_use]
    pub fn into_preview(self) -> Self {
        Self {
            count: PREVIEW_COUNT,
            preview: true,
            ..self
        }
    }

    #[must_use]
    pub fn with_count(self, count: u32) -> Self {
        Self { count, ..self }
    }

    #[must_use]
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..self
        }
    }
}

/// Lifecycle of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Running,
    Completed,
    Cancelled,
}

impl BatchState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// Streamed progress of a batch, in item order.
#[derive(Debug)]
pub enum BatchEvent {
    /// A draft was generated. Outside preview mode it is already in the store.
    ItemCompleted { index: u32, draft: DraftArtifact },
    ItemFailed { index: u32, error: ItemError },
    /// Items finished so far, successful or not.
    Progress { done: u32, total: u32 },
    BatchCompleted { succeeded: u32, failed: u32 },
    BatchCancelled { completed: u32 },
}

impl BatchEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::BatchCompleted { .. } | Self::BatchCancelled { .. }
        )
    }
}

/// A preview draft: the artifact as shown, and the content to promote.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewDraft {
    /// Tagged with a provisional id that is not reserved.
    pub provisional: DraftArtifact,
    pub content: NewDraft,
}

/// Final account of a batch.
#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub batch_id: Uuid,
    pub total: u32,
    pub succeeded: u32,
    pub failed: u32,
    pub state: BatchState,
    pub usage: TokenUsage,
    /// Empty outside preview mode.
    pub previews: Vec<PreviewDraft>,
    pub elapsed: Duration,
}

/// Requests cancellation of a batch. Cheap to clone.
#[derive(Debug, Clone)]
pub struct BatchCanceller {
    tx: Arc<watch::Sender<bool>>,
}

impl BatchCanceller {
    pub(crate) fn new(tx: watch::Sender<bool>) -> Self {
        Self { tx: Arc::new(tx) }
    }

    /// Stop the batch before its next call. An in-flight call is abandoned.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Handle on a running batch.
#[derive(Debug)]
pub struct BatchHandle {
    id: Uuid,
    total: u32,
    events: mpsc::UnboundedReceiver<BatchEvent>,
    canceller: BatchCanceller,
    state: watch::Receiver<BatchState>,
    task: JoinHandle<BatchSummary>,
}

impl BatchHandle {
    pub(crate) fn new(
        id: Uuid,
        total: u32,
        events: mpsc::UnboundedReceiver<BatchEvent>,
        canceller: BatchCanceller,
        state: watch::Receiver<BatchState>,
        task: JoinHandle<BatchSummary>,
    ) -> Self {
        Self {
            id,
            total,
            events,
            canceller,
            state,
            task,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    /// Next event, or `None` once the batch has ended and the stream is drained.
    pub async fn next_event(&mut self) -> Option<BatchEvent> {
        self.events.recv().await
    }

    pub fn cancel(&self) {
        self.canceller.cancel();
    }

    /// A canceller usable from another task.
    pub fn canceller(&self) -> BatchCanceller {
        self.canceller.clone()
    }

    pub fn state(&self) -> BatchState {
        *self.state.borrow()
    }

    /// Wait for the batch task and return its summary.
    ///
    /// Undelivered events are dropped.
    pub async fn finish(self) -> Result<BatchSummary, BatchError> {
        Ok(self.task.await?)
    }
}

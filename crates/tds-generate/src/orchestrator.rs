//! Batch orchestration: one background task per batch.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tds_model::{Classification, DraftArtifact, NewDraft, validate, validate_email_count};
use tds_persistence::{StateStore, StoreError};
use tokio::sync::{mpsc, watch};
use uuid::Uuid;

use crate::batch::{
    BatchCanceller, BatchEvent, BatchHandle, BatchRequest, BatchState, BatchSummary, PreviewDraft,
};
use crate::catalog::Catalog;
use crate::distribution::{Distributor, plan_custom};
use crate::error::{InvalidRequest, ItemError};
use crate::provider::{ContentProvider, ContentRequest, ContentResponse};
use crate::rate_limit::RateLimiter;
use crate::retry::RetryPolicy;
use crate::usage::TokenUsage;

/// Orchestrator tuning. Not user-facing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Minimum spacing between provider calls across all batches.
    pub min_call_spacing: Duration,
    pub retry: RetryPolicy,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            min_call_spacing: Duration::from_millis(200),
            retry: RetryPolicy::default(),
        }
    }
}

/// Runs generation batches against a content provider and the state store.
pub struct Orchestrator<P> {
    provider: Arc<P>,
    store: Arc<StateStore>,
    limiter: Arc<RateLimiter>,
    catalog: Arc<Catalog>,
    retry: RetryPolicy,
}

impl<P: ContentProvider> Orchestrator<P> {
    pub fn new(provider: P, store: Arc<StateStore>, config: OrchestratorConfig) -> Self {
        Self {
            provider: Arc::new(provider),
            store,
            limiter: Arc::new(RateLimiter::new(config.min_call_spacing)),
            catalog: Arc::new(Catalog::builtin()),
            retry: config.retry,
        }
    }

    /// Use `catalog` for guided batches.
    #[must_use]
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Arc::new(catalog);
        self
    }

    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Validate `request` and start it in the background.
    ///
    /// Must be called from within a Tokio runtime. Dropping the handle
    /// detaches the batch; it keeps running to completion.
    pub fn start_batch(&self, request: BatchRequest) -> Result<BatchHandle, InvalidRequest> {
        let request = if request.preview {
            request.into_preview()
        } else {
            request
        };
        validate_email_count(request.count).map_err(InvalidRequest::Count)?;
        validate::required_email("recipient", &request.recipient)
            .map_err(InvalidRequest::Recipient)?;

        let plan = if request.custom_prompt.is_some() {
            plan_custom(request.count)
        } else {
            let mut rng = request
                .seed
                .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
            Distributor::new(&self.catalog).plan(request.count, &mut rng)
        };

        let id = Uuid::new_v4();
        let total = request.count;
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (state_tx, state_rx) = watch::channel(BatchState::Idle);

        let run = BatchRun {
            id,
            provisional_start: self.store.read(|state| state.generation.next_ticket_number),
            request,
            provider: Arc::clone(&self.provider),
            store: Arc::clone(&self.store),
            limiter: Arc::clone(&self.limiter),
            retry: self.retry.clone(),
            events: event_tx,
            state: state_tx,
        };
        let task = tokio::spawn(run.run(plan, cancel_rx));

        Ok(BatchHandle::new(
            id,
            total,
            event_rx,
            BatchCanceller::new(cancel_tx),
            state_rx,
            task,
        ))
    }

    /// Append preview drafts to the store in order, assigning real ids.
    pub fn promote(&self, previews: Vec<PreviewDraft>) -> Result<Vec<DraftArtifact>, StoreError> {
        previews
            .into_iter()
            .map(|preview| self.store.append_draft(preview.content))
            .collect()
    }
}

#[derive(Default)]
struct Tally {
    succeeded: u32,
    failed: u32,
    usage: TokenUsage,
    previews: Vec<PreviewDraft>,
}

struct BatchRun<P> {
    id: Uuid,
    request: BatchRequest,
    provisional_start: u64,
    provider: Arc<P>,
    store: Arc<StateStore>,
    limiter: Arc<RateLimiter>,
    retry: RetryPolicy,
    events: mpsc::UnboundedSender<BatchEvent>,
    state: watch::Sender<BatchState>,
}

impl<P: ContentProvider> BatchRun<P> {
    async fn run(
        self,
        plan: Vec<Classification>,
        mut cancel: watch::Receiver<bool>,
    ) -> BatchSummary {
        let started = Instant::now();
        let total = self.request.count;
        self.state.send_replace(BatchState::Running);
        tracing::info!(
            batch = %self.id,
            total,
            preview = self.request.preview,
            custom = self.request.custom_prompt.is_some(),
            "batch started"
        );

        let mut tally = Tally::default();
        let mut cancelled = false;
        for (index, classification) in (0u32..).zip(plan) {
            if *cancel.borrow() {
                cancelled = true;
                break;
            }
            if index > 0 && !self.request.wait_time.is_zero() {
                let pause = tokio::time::sleep(self.request.wait_time);
                if until_cancelled(&mut cancel, pause).await.is_none() {
                    cancelled = true;
                    break;
                }
            }

            let request = ContentRequest {
                classification,
                quality: self.request.quality,
                custom_prompt: self.request.custom_prompt.clone(),
                position: (index + 1, total),
            };
            let Some(result) = until_cancelled(&mut cancel, self.generate(&request)).await else {
                tracing::debug!(batch = %self.id, item = index, "in-flight call abandoned");
                cancelled = true;
                break;
            };
            self.finish_item(index, request.classification, result, &mut tally);
            self.emit(BatchEvent::Progress {
                done: index + 1,
                total,
            });
        }

        let state = if cancelled {
            BatchState::Cancelled
        } else {
            BatchState::Completed
        };
        self.state.send_replace(state);
        if cancelled {
            tracing::info!(batch = %self.id, completed = tally.succeeded, "batch cancelled");
            self.emit(BatchEvent::BatchCancelled {
                completed: tally.succeeded,
            });
        } else {
            tracing::info!(
                batch = %self.id,
                succeeded = tally.succeeded,
                failed = tally.failed,
                input_tokens = tally.usage.input_tokens,
                output_tokens = tally.usage.output_tokens,
                "batch completed"
            );
            self.emit(BatchEvent::BatchCompleted {
                succeeded: tally.succeeded,
                failed: tally.failed,
            });
        }

        BatchSummary {
            batch_id: self.id,
            total,
            succeeded: tally.succeeded,
            failed: tally.failed,
            state,
            usage: tally.usage,
            previews: tally.previews,
            elapsed: started.elapsed(),
        }
    }

    /// Call the provider, retrying retryable failures.
    async fn generate(&self, request: &ContentRequest) -> Result<ContentResponse, ItemError> {
        let mut attempt = 1;
        loop {
            self.limiter.acquire().await;
            let err = match self.provider.generate(request).await {
                Ok(response) => return Ok(response),
                Err(err) => err,
            };
            let Some(delay) = self.retry.delay_after(attempt, &err) else {
                return Err(ItemError::Generation {
                    attempts: attempt,
                    source: err,
                });
            };
            tracing::warn!(
                batch = %self.id,
                item = request.position.0,
                attempt,
                ?delay,
                error = %err,
                "provider call failed, retrying"
            );
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            attempt += 1;
        }
    }

    fn finish_item(
        &self,
        index: u32,
        classification: Classification,
        result: Result<ContentResponse, ItemError>,
        tally: &mut Tally,
    ) {
        let outcome = result.and_then(|response| {
            if let Some(usage) = response.usage {
                tally.usage += usage;
            }
            let content = NewDraft {
                classification,
                subject: response.subject,
                body: response.body,
                recipient: self.request.recipient.clone(),
            };
            self.accept(content, tally)
        });

        match outcome {
            Ok(draft) => {
                tally.succeeded += 1;
                tracing::debug!(batch = %self.id, item = index, id = draft.id, "item completed");
                self.emit(BatchEvent::ItemCompleted { index, draft });
            }
            Err(error) => {
                tally.failed += 1;
                tracing::warn!(batch = %self.id, item = index, error = %error, "item failed");
                self.emit(BatchEvent::ItemFailed { index, error });
            }
        }
    }

    /// Store the draft, or hold it as a preview under a provisional id.
    fn accept(&self, content: NewDraft, tally: &mut Tally) -> Result<DraftArtifact, ItemError> {
        if !self.request.preview {
            return Ok(self.store.append_draft(content)?);
        }
        content.validate().map_err(StoreError::from)?;
        let id = self.provisional_start + tally.previews.len() as u64;
        let provisional = content.clone().into_artifact(id);
        tally.previews.push(PreviewDraft {
            provisional: provisional.clone(),
            content,
        });
        Ok(provisional)
    }

    fn emit(&self, event: BatchEvent) {
        // The receiver may have been dropped; the batch still runs to the end.
        let _ = self.events.send(event);
    }
}

/// Run `fut` unless the batch is cancelled first.
///
/// Returns `None` if cancellation was observed before or while `fut` ran,
/// including when `fut` finished in the same instant.
async fn until_cancelled<F: Future>(
    cancel: &mut watch::Receiver<bool>,
    fut: F,
) -> Option<F::Output> {
    let output = tokio::select! {
        biased;
        () = cancellation(cancel) => None,
        output = fut => Some(output),
    };
    output.filter(|_| !*cancel.borrow())
}

/// Resolves once the cancel flag is set. Pends forever if every canceller
/// is gone.
async fn cancellation(cancel: &mut watch::Receiver<bool>) {
    let closed = cancel.wait_for(|cancelled| *cancelled).await.is_err();
    if closed {
        std::future::pending::<()>().await;
    }
}

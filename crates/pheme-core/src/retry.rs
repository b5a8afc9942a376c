//! Whole-run retry around the orchestrator, with a durable checkpoint.

use std::time::Duration;

use crate::error::AppError;
use crate::models::ScrapedEntity;
use crate::orchestrator::ScrapeOrchestrator;
use crate::state::WorkState;
use crate::traits::{CheckpointSink, DelayProvider, PageDriver};

/// Attempt budget and backoff schedule for whole-run retries.
///
/// Delay after a failed attempt `n` (1-indexed) is `base^n` seconds:
/// 3s, 9s, 27s, 81s with the defaults.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_secs: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_secs: 3,
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = max;
        self
    }

    /// Backoff to sleep after failed attempt `attempt` (1-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        Duration::from_secs(self.base_secs.saturating_pow(attempt))
    }
}

/// Wraps orchestrator runs in the retry/checkpoint protocol.
///
/// Retry is whole-run: a failed attempt is re-run against the *same*
/// [`WorkState`], so already-committed entities are not reprocessed. A
/// re-attempted entity restarts its pagination from page one; its
/// discarded partial pages were never committed, so nothing duplicates.
///
/// The checkpoint sink is flushed exactly once: with the full results on
/// success, or with the partial results when the budget is exhausted.
pub struct RetryCoordinator<D, P, S>
where
    D: PageDriver,
    P: DelayProvider,
    S: CheckpointSink,
{
    orchestrator: ScrapeOrchestrator<D, P>,
    sink: S,
    policy: RetryPolicy,
}

impl<D, P, S> RetryCoordinator<D, P, S>
where
    D: PageDriver,
    P: DelayProvider,
    S: CheckpointSink,
{
    pub fn new(orchestrator: ScrapeOrchestrator<D, P>, sink: S, policy: RetryPolicy) -> Self {
        Self {
            orchestrator,
            sink,
            policy,
        }
    }

    /// Run to completion or exhaustion. On success returns the full
    /// results map; on exhaustion returns [`AppError::RetriesExhausted`]
    /// after flushing whatever was committed.
    pub async fn run(&self, state: &mut WorkState) -> Result<Vec<ScrapedEntity>, AppError> {
        for attempt in 1..=self.policy.max_attempts {
            match self.orchestrator.run(state).await {
                Ok(()) => {
                    let snapshot = state.snapshot();
                    self.sink.flush(&snapshot)?;
                    tracing::info!(entities = snapshot.len(), "scrape complete");
                    return Ok(snapshot);
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "scrape attempt failed");
                    if attempt < self.policy.max_attempts {
                        tokio::time::sleep(self.policy.delay_for_attempt(attempt)).await;
                    }
                }
            }
        }

        let snapshot = state.snapshot();
        if let Err(e) = self.sink.flush(&snapshot) {
            tracing::error!(error = %e, "checkpoint flush failed");
        } else {
            tracing::warn!(entities = snapshot.len(), "checkpointed partial results");
        }
        Err(AppError::RetriesExhausted {
            attempts: self.policy.max_attempts,
        })
    }
}

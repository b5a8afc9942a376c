use std::future::Future;
use std::time::Duration;

use crate::error::AppError;
use crate::models::ScrapedEntity;

/// Remote-controlled browser page capability.
///
/// The core consumes this interface for every DOM-touching step and never
/// sees the underlying automation library. One page session is reused
/// sequentially across all entities; implementations do not need to be
/// safe against concurrent calls.
///
/// Timeouts on the wait methods are expected control flow, not errors:
/// `wait_visible` resolves to `None` and `wait_hidden` to `false` when the
/// deadline passes. `Err` is reserved for the session itself failing.
pub trait PageDriver: Send + Sync + Clone {
    /// Opaque reference to one element on the current page.
    type Handle: Send + Sync + Clone;

    /// Navigate to `url` and wait for the page to settle.
    fn navigate(&self, url: &str) -> impl Future<Output = Result<(), AppError>> + Send;

    /// First element matching `selector`, if any.
    fn query(
        &self,
        selector: &str,
    ) -> impl Future<Output = Result<Option<Self::Handle>, AppError>> + Send;

    /// All elements matching `selector`, in document order.
    fn query_all(
        &self,
        selector: &str,
    ) -> impl Future<Output = Result<Vec<Self::Handle>, AppError>> + Send;

    /// First descendant of `handle` matching `selector`, if any.
    fn query_within(
        &self,
        handle: &Self::Handle,
        selector: &str,
    ) -> impl Future<Output = Result<Option<Self::Handle>, AppError>> + Send;

    /// Wait up to `timeout` for `selector` to appear.
    fn wait_visible(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<Option<Self::Handle>, AppError>> + Send;

    /// Wait up to `timeout` for `selector` to be gone. Returns whether the
    /// element disappeared before the deadline.
    fn wait_hidden(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<bool, AppError>> + Send;

    fn click(&self, handle: &Self::Handle) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Visible text of the element's subtree.
    fn text(&self, handle: &Self::Handle)
    -> impl Future<Output = Result<String, AppError>> + Send;

    fn attribute(
        &self,
        handle: &Self::Handle,
        name: &str,
    ) -> impl Future<Output = Result<Option<String>, AppError>> + Send;

    /// Run an inline script in the page, discarding its result.
    fn evaluate(&self, script: &str) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Fixed pause, driver-side.
    fn sleep(&self, ms: u64) -> impl Future<Output = ()> + Send;
}

/// Source of pacing delays between automation actions.
///
/// Production uses randomized bounds; tests inject a zero-delay provider.
/// Delays are pacing devices only — outcomes must not depend on them.
pub trait DelayProvider: Send + Sync + Clone {
    /// Sleep for a duration drawn uniformly from `[min_ms, max_ms)`.
    fn jitter(&self, min_ms: u64, max_ms: u64) -> impl Future<Output = ()> + Send;
}

/// Receives the one durable flush of accumulated results.
///
/// Called exactly once per process execution: with the full results on
/// normal completion, or with the partial results when the retry budget is
/// exhausted.
pub trait CheckpointSink: Send + Sync {
    fn flush(&self, records: &[ScrapedEntity]) -> Result<(), AppError>;
}

/// A no-op CheckpointSink for use when no durable output is needed.
#[derive(Debug, Clone)]
pub struct NullSink;

impl CheckpointSink for NullSink {
    fn flush(&self, _records: &[ScrapedEntity]) -> Result<(), AppError> {
        Ok(())
    }
}

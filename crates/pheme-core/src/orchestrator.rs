//! One scrape attempt over the remaining queue.

use crate::error::AppError;
use crate::pipeline::{EntityOutcome, EntityPipeline};
use crate::state::WorkState;
use crate::traits::{DelayProvider, PageDriver};

/// Runs the per-entity pipeline across a stable copy of the remaining
/// queue, committing each completed entity.
///
/// Hard failures propagate immediately — there is no per-entity retry.
/// Entities committed before the failure stay committed, which is what
/// lets a whole-run retry resume instead of restarting.
pub struct ScrapeOrchestrator<D, P>
where
    D: PageDriver,
    P: DelayProvider,
{
    pipeline: EntityPipeline<D, P>,
}

impl<D, P> ScrapeOrchestrator<D, P>
where
    D: PageDriver,
    P: DelayProvider,
{
    pub fn new(driver: D, delay: P) -> Self {
        Self {
            pipeline: EntityPipeline::new(driver, delay),
        }
    }

    pub async fn run(&self, state: &mut WorkState) -> Result<(), AppError> {
        for mut entity in state.remaining() {
            match self.pipeline.process(&mut entity).await? {
                EntityOutcome::Scraped(reviews) => state.commit(entity, reviews),
                EntityOutcome::Skipped => {}
            }
        }
        tracing::info!(
            committed = state.committed_count(),
            skipped = state.remaining_count(),
            "attempt complete"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Entity;
    use crate::testutil::*;

    fn site(reviews: Vec<FakeElement>) -> Vec<FakePage> {
        vec![entity_front_page("Addr", listing_page(reviews, None))]
    }

    fn one_review() -> Vec<FakeElement> {
        vec![fragment("T", "May 1, 2025", "text", "bubble_40")]
    }

    #[tokio::test]
    async fn commits_every_scraped_entity() {
        let driver = MockDriver::new()
            .with_site("https://example.com/a", site(one_review()))
            .with_site("https://example.com/b", site(one_review()));
        let orchestrator = ScrapeOrchestrator::new(driver, NoDelay::new());
        let mut state = WorkState::new(vec![
            Entity::new("A", "#1", "https://example.com/a"),
            Entity::new("B", "#2", "https://example.com/b"),
        ]);

        orchestrator.run(&mut state).await.unwrap();

        assert_eq!(state.committed_count(), 2);
        assert_eq!(state.remaining_count(), 0);
    }

    #[tokio::test]
    async fn hard_failure_keeps_earlier_commits() {
        let driver = MockDriver::new()
            .with_site("https://example.com/a", site(one_review()))
            .with_site("https://example.com/b", site(one_review()))
            .fail_navigations("https://example.com/b", 1);
        let orchestrator = ScrapeOrchestrator::new(driver, NoDelay::new());
        let mut state = WorkState::new(vec![
            Entity::new("A", "#1", "https://example.com/a"),
            Entity::new("B", "#2", "https://example.com/b"),
        ]);

        let err = orchestrator.run(&mut state).await.unwrap_err();

        assert!(matches!(err, crate::AppError::Navigation(_)));
        assert_eq!(state.committed_count(), 1);
        assert_eq!(state.snapshot()[0].url, "https://example.com/a");
        // The failed entity is still queued; nothing partial was written.
        assert_eq!(state.remaining_count(), 1);
    }

    #[tokio::test]
    async fn skipped_entity_is_left_in_queue() {
        // Site without a language filter: gate reads it as "no reviews".
        let no_filter = vec![
            listing_page(one_review(), None).with(
                crate::selectors::ADDRESS,
                FakeElement::text("Addr"),
            ),
        ];
        let driver = MockDriver::new().with_site("https://example.com/a", no_filter);
        let orchestrator = ScrapeOrchestrator::new(driver, NoDelay::new());
        let mut state = WorkState::new(vec![Entity::new("A", "#1", "https://example.com/a")]);

        orchestrator.run(&mut state).await.unwrap();

        assert_eq!(state.committed_count(), 0);
        assert_eq!(state.remaining_count(), 1);
    }
}

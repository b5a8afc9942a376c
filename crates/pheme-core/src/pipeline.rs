//! Per-entity orchestration: navigate, consent, address, language gate,
//! then hand the listing to the pagination engine.

use std::time::Duration;

use crate::error::AppError;
use crate::models::{Entity, Review};
use crate::pagination::PaginationEngine;
use crate::selectors;
use crate::traits::{DelayProvider, PageDriver};

/// Soft wait for the consent banner's accept control.
const CONSENT_TIMEOUT: Duration = Duration::from_millis(300);
/// Settle time after dismissing the banner.
const CONSENT_SETTLE_MS: u64 = 500;
/// Soft wait for the "all languages" filter control.
const FILTER_TIMEOUT: Duration = Duration::from_millis(1000);
/// Settle time after switching the filter.
const FILTER_SETTLE_MS: u64 = 1000;
/// Bounded wait for the loading overlay after the filter reloads the list.
const LOADING_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of running the pipeline for one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityOutcome {
    /// The language gate passed and the listing was walked to exhaustion.
    Scraped(Vec<Review>),
    /// The language filter never appeared — read as "no reviews". The
    /// entity is not committed and stays in the remaining queue.
    Skipped,
}

/// Runs the fixed per-entity step sequence against one page session.
pub struct EntityPipeline<D, P>
where
    D: PageDriver,
    P: DelayProvider,
{
    driver: D,
    delay: P,
}

impl<D, P> EntityPipeline<D, P>
where
    D: PageDriver,
    P: DelayProvider,
{
    pub fn new(driver: D, delay: P) -> Self {
        Self { driver, delay }
    }

    /// Process one entity. Fills in `entity.address` as a side effect.
    ///
    /// Consent-banner absence is soft; a missing address element or any
    /// driver fault is a hard error that propagates to the caller.
    pub async fn process(&self, entity: &mut Entity) -> Result<EntityOutcome, AppError> {
        tracing::info!(name = %entity.name, url = %entity.url, "processing entity");
        self.driver.navigate(&entity.url).await?;

        self.dismiss_consent().await?;

        let address_el = self
            .driver
            .query(selectors::ADDRESS)
            .await?
            .ok_or_else(|| AppError::Extract("address element missing".into()))?;
        entity.address = Some(self.driver.text(&address_el).await?);

        if !self.apply_language_filter().await? {
            tracing::info!(name = %entity.name, "no reviews");
            return Ok(EntityOutcome::Skipped);
        }

        let reviews = PaginationEngine::new(self.driver.clone(), self.delay.clone())
            .collect()
            .await?;
        tracing::info!(name = %entity.name, reviews = reviews.len(), "entity scraped");
        Ok(EntityOutcome::Scraped(reviews))
    }

    /// Accept the cookie banner if it shows up within the soft timeout.
    /// Not seeing it means it was already dismissed.
    async fn dismiss_consent(&self) -> Result<(), AppError> {
        match self
            .driver
            .wait_visible(selectors::CONSENT_ACCEPT, CONSENT_TIMEOUT)
            .await?
        {
            Some(accept) => {
                self.driver.click(&accept).await?;
                self.driver.sleep(CONSENT_SETTLE_MS).await;
            }
            None => tracing::debug!("no consent banner"),
        }
        Ok(())
    }

    /// Switch the review listing to all languages. Returns whether the
    /// control was found — absence gates the entity out of pagination.
    async fn apply_language_filter(&self) -> Result<bool, AppError> {
        let Some(filter) = self
            .driver
            .wait_visible(selectors::LANGUAGE_ALL, FILTER_TIMEOUT)
            .await?
        else {
            return Ok(false);
        };

        self.driver.click(&filter).await?;
        self.driver.sleep(FILTER_SETTLE_MS).await;
        let _ = self
            .driver
            .wait_hidden(selectors::LOADING_INDICATOR, LOADING_TIMEOUT)
            .await;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::*;

    const URL: &str = "https://example.com/r/1";

    fn entity() -> Entity {
        Entity::new("Trattoria", "#1 of 10", URL)
    }

    fn one_review_listing() -> FakePage {
        listing_page(
            vec![fragment("T", "May 1, 2025", "nice", "bubble_50")],
            None,
        )
    }

    #[tokio::test]
    async fn scrapes_entity_and_fills_address() {
        let driver = MockDriver::new().with_site(
            URL,
            vec![entity_front_page("Via Roma 1", one_review_listing())],
        );
        let pipeline = EntityPipeline::new(driver, NoDelay::new());
        let mut entity = entity();

        let outcome = pipeline.process(&mut entity).await.unwrap();

        assert_eq!(entity.address.as_deref(), Some("Via Roma 1"));
        let EntityOutcome::Scraped(reviews) = outcome else {
            panic!("expected Scraped");
        };
        assert_eq!(reviews.len(), 1);
    }

    #[tokio::test]
    async fn consent_banner_is_clicked_when_present() {
        let page = entity_front_page("Addr", one_review_listing()).with(
            selectors::CONSENT_ACCEPT,
            FakeElement::text("Accept").with_role("consent"),
        );
        let driver = MockDriver::new().with_site(URL, vec![page]);
        let pipeline = EntityPipeline::new(driver.clone(), NoDelay::new());

        pipeline.process(&mut entity()).await.unwrap();

        assert!(driver.clicks().contains(&"consent".to_string()));
        assert!(driver.slept_ms().contains(&500));
    }

    #[tokio::test]
    async fn absent_consent_banner_is_soft() {
        let driver = MockDriver::new()
            .with_site(URL, vec![entity_front_page("Addr", one_review_listing())]);
        let pipeline = EntityPipeline::new(driver.clone(), NoDelay::new());

        let outcome = pipeline.process(&mut entity()).await.unwrap();

        assert!(matches!(outcome, EntityOutcome::Scraped(_)));
        assert!(!driver.clicks().contains(&"consent".to_string()));
    }

    #[tokio::test]
    async fn missing_language_filter_skips_entity() {
        // Listing page with address but no language filter.
        let page =
            one_review_listing().with(selectors::ADDRESS, FakeElement::text("Addr"));
        let driver = MockDriver::new().with_site(URL, vec![page]);
        let pipeline = EntityPipeline::new(driver.clone(), NoDelay::new());
        let mut entity = entity();

        let outcome = pipeline.process(&mut entity).await.unwrap();

        assert_eq!(outcome, EntityOutcome::Skipped);
        // Gate short-circuits before pagination: nothing was clicked.
        assert!(driver.clicks().is_empty());
    }

    #[tokio::test]
    async fn missing_address_is_hard_error() {
        let page = one_review_listing().with(selectors::LANGUAGE_ALL, FakeElement::default());
        let driver = MockDriver::new().with_site(URL, vec![page]);
        let pipeline = EntityPipeline::new(driver, NoDelay::new());

        let err = pipeline.process(&mut entity()).await.unwrap_err();
        assert!(matches!(err, AppError::Extract(_)));
    }

    #[tokio::test]
    async fn navigation_failure_propagates() {
        let driver = MockDriver::new()
            .with_site(URL, vec![entity_front_page("Addr", one_review_listing())])
            .fail_navigations(URL, 1);
        let pipeline = EntityPipeline::new(driver, NoDelay::new());

        let err = pipeline.process(&mut entity()).await.unwrap_err();
        assert!(matches!(err, AppError::Navigation(_)));
    }
}

//! Drives one entity's review listing to exhaustion, page by page.

use std::time::Duration;

use crate::decode::{self, RawFragment};
use crate::error::AppError;
use crate::models::Review;
use crate::selectors;
use crate::traits::{DelayProvider, PageDriver};

/// Jitter after expanding truncated text, before reading it.
const EXPAND_JITTER_MS: (u64, u64) = (500, 1500);
/// Jitter after advancing to the next page.
const ADVANCE_JITTER_MS: (u64, u64) = (500, 2000);
/// Bounded wait for the loading overlay to clear after an advance.
const LOADING_TIMEOUT: Duration = Duration::from_secs(10);

/// Walks a review listing from the page the driver is currently on,
/// returning every review across all pages in document order.
pub struct PaginationEngine<D, P>
where
    D: PageDriver,
    P: DelayProvider,
{
    driver: D,
    delay: P,
}

impl<D, P> PaginationEngine<D, P>
where
    D: PageDriver,
    P: DelayProvider,
{
    pub fn new(driver: D, delay: P) -> Self {
        Self { driver, delay }
    }

    /// Collect all reviews, expanding truncated entries and following the
    /// "next" control until it is absent or disabled.
    ///
    /// Decode problems are hard errors; anything going wrong around the
    /// "next" control is a soft end-of-listing.
    pub async fn collect(&self) -> Result<Vec<Review>, AppError> {
        let mut reviews = Vec::new();
        let mut page = 1u32;

        loop {
            let fragments = self.driver.query_all(selectors::REVIEW_FRAGMENT).await?;

            // Expanding mutates the fragments in place; give the re-render
            // a moment before reading text out of them.
            if self.driver.query(selectors::EXPAND_CONTROL).await?.is_some() {
                self.driver.evaluate(selectors::EXPAND_SCRIPT).await?;
                self.delay
                    .jitter(EXPAND_JITTER_MS.0, EXPAND_JITTER_MS.1)
                    .await;
            }

            for fragment in &fragments {
                let raw = self.read_fragment(fragment).await?;
                reviews.push(decode::decode_review(&raw)?);
            }
            tracing::info!(page, total = reviews.len(), "page decoded");

            if !self.advance().await {
                break;
            }
            page += 1;
        }

        Ok(reviews)
    }

    /// Read one fragment's sub-elements into a [`RawFragment`]. A missing
    /// title, date, or rating sub-element is an extraction error.
    async fn read_fragment(&self, fragment: &D::Handle) -> Result<RawFragment, AppError> {
        let title_el = self
            .driver
            .query_within(fragment, selectors::REVIEW_TITLE)
            .await?
            .ok_or_else(|| AppError::Extract("review title element missing".into()))?;
        let title = self.driver.text(&title_el).await?;

        let date_el = self
            .driver
            .query_within(fragment, selectors::REVIEW_DATE)
            .await?
            .ok_or_else(|| AppError::Extract("review date element missing".into()))?;
        let date_attr = self
            .driver
            .attribute(&date_el, "title")
            .await?
            .ok_or_else(|| AppError::Extract("review date title attribute missing".into()))?;

        let rating_el = self
            .driver
            .query_within(fragment, selectors::REVIEW_RATING)
            .await?
            .ok_or_else(|| AppError::Extract("review rating element missing".into()))?;
        let rating_class = self
            .driver
            .attribute(&rating_el, "class")
            .await?
            .ok_or_else(|| AppError::Extract("review rating class attribute missing".into()))?;

        let text = self.driver.text(fragment).await?;

        let hidden_text = match self
            .driver
            .query_within(fragment, selectors::REVIEW_HIDDEN_TEXT)
            .await?
        {
            Some(el) => Some(self.driver.text(&el).await?),
            None => None,
        };

        Ok(RawFragment {
            title,
            date_attr,
            rating_class,
            text,
            hidden_text,
        })
    }

    /// Try to move to the next page. `false` means the listing is
    /// exhausted: no "next" control, a disabled one, or any failure while
    /// locating or operating it.
    async fn advance(&self) -> bool {
        let next = match self.driver.query(selectors::NEXT_CONTROL).await {
            Ok(Some(handle)) => handle,
            Ok(None) | Err(_) => return false,
        };

        match self.driver.attribute(&next, "class").await {
            Ok(Some(class)) if !class.contains(selectors::NEXT_DISABLED_MARKER) => {}
            _ => return false,
        }

        if self.driver.click(&next).await.is_err() {
            return false;
        }
        let _ = self
            .driver
            .wait_hidden(selectors::LOADING_INDICATOR, LOADING_TIMEOUT)
            .await;
        self.delay
            .jitter(ADVANCE_JITTER_MS.0, ADVANCE_JITTER_MS.1)
            .await;
        true
    }
}

//! Test utilities: mock implementations of the core capability traits.
//!
//! Handwritten mocks for dependency injection in unit tests. All mocks use
//! `Arc<Mutex<_>>` for interior mutability, allowing test assertions on
//! recorded calls. `MockDriver` plays back scripted page content instead
//! of a browser: each URL maps to a sequence of pages, and clicking an
//! element with the `next` role advances to the following page.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::AppError;
use crate::models::ScrapedEntity;
use crate::selectors;
use crate::traits::{CheckpointSink, DelayProvider, PageDriver};

// ---------------------------------------------------------------------------
// FakeElement / FakePage
// ---------------------------------------------------------------------------

/// Role marker for the pagination "next" control; clicking it advances the
/// scripted page.
pub const ROLE_NEXT: &str = "next";

/// One scripted DOM element: text, attributes, and sub-elements keyed by
/// the selector they answer to.
#[derive(Debug, Clone, Default)]
pub struct FakeElement {
    pub text: String,
    pub attrs: HashMap<String, String>,
    pub children: HashMap<String, FakeElement>,
    pub role: Option<String>,
}

impl FakeElement {
    pub fn text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Self::default()
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_child(mut self, selector: &str, child: FakeElement) -> Self {
        self.children.insert(selector.to_string(), child);
        self
    }

    pub fn with_role(mut self, role: &str) -> Self {
        self.role = Some(role.to_string());
        self
    }

    /// Label recorded when this element is clicked.
    fn click_label(&self) -> String {
        self.role.clone().unwrap_or_else(|| self.text.clone())
    }
}

/// One scripted page: selector → matching elements, in document order.
#[derive(Debug, Clone, Default)]
pub struct FakePage {
    elements: HashMap<String, Vec<FakeElement>>,
}

impl FakePage {
    pub fn with(mut self, selector: &str, element: FakeElement) -> Self {
        self.elements
            .entry(selector.to_string())
            .or_default()
            .push(element);
        self
    }

    pub fn with_all(mut self, selector: &str, elements: Vec<FakeElement>) -> Self {
        self.elements
            .entry(selector.to_string())
            .or_default()
            .extend(elements);
        self
    }
}

// ---------------------------------------------------------------------------
// MockDriver
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MockDriverState {
    /// URL → scripted page sequence.
    sites: HashMap<String, Vec<FakePage>>,
    current_site: Option<String>,
    current_page: usize,
    /// URL → number of upcoming navigations that fail.
    navigate_failures: HashMap<String, u32>,
    navigations: Vec<String>,
    clicks: Vec<String>,
    scripts: Vec<String>,
    slept_ms: Vec<u64>,
}

impl MockDriverState {
    fn page(&self) -> FakePage {
        self.current_site
            .as_ref()
            .and_then(|url| self.sites.get(url))
            .and_then(|pages| pages.get(self.current_page))
            .cloned()
            .unwrap_or_default()
    }
}

/// Mock page driver that replays scripted sites.
#[derive(Clone, Default)]
pub struct MockDriver {
    state: Arc<Mutex<MockDriverState>>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a site: navigating to `url` lands on `pages[0]`, and each
    /// click on a `ROLE_NEXT` element advances one page.
    pub fn with_site(self, url: &str, pages: Vec<FakePage>) -> Self {
        self.state
            .lock()
            .unwrap()
            .sites
            .insert(url.to_string(), pages);
        self
    }

    /// Make the next `times` navigations to `url` fail.
    pub fn fail_navigations(self, url: &str, times: u32) -> Self {
        self.state
            .lock()
            .unwrap()
            .navigate_failures
            .insert(url.to_string(), times);
        self
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().unwrap().navigations.clone()
    }

    pub fn clicks(&self) -> Vec<String> {
        self.state.lock().unwrap().clicks.clone()
    }

    pub fn scripts(&self) -> Vec<String> {
        self.state.lock().unwrap().scripts.clone()
    }

    pub fn slept_ms(&self) -> Vec<u64> {
        self.state.lock().unwrap().slept_ms.clone()
    }
}

impl PageDriver for MockDriver {
    type Handle = FakeElement;

    async fn navigate(&self, url: &str) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        state.navigations.push(url.to_string());
        if let Some(remaining) = state.navigate_failures.get_mut(url)
            && *remaining > 0
        {
            *remaining -= 1;
            return Err(AppError::Navigation(format!("{url}: scripted failure")));
        }
        state.current_site = Some(url.to_string());
        state.current_page = 0;
        Ok(())
    }

    async fn query(&self, selector: &str) -> Result<Option<FakeElement>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .page()
            .elements
            .get(selector)
            .and_then(|els| els.first())
            .cloned())
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<FakeElement>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .page()
            .elements
            .get(selector)
            .cloned()
            .unwrap_or_default())
    }

    async fn query_within(
        &self,
        handle: &FakeElement,
        selector: &str,
    ) -> Result<Option<FakeElement>, AppError> {
        Ok(handle.children.get(selector).cloned())
    }

    async fn wait_visible(
        &self,
        selector: &str,
        _timeout: Duration,
    ) -> Result<Option<FakeElement>, AppError> {
        self.query(selector).await
    }

    async fn wait_hidden(&self, selector: &str, _timeout: Duration) -> Result<bool, AppError> {
        Ok(self.query(selector).await?.is_none())
    }

    async fn click(&self, handle: &FakeElement) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        state.clicks.push(handle.click_label());
        if handle.role.as_deref() == Some(ROLE_NEXT) {
            let last = state
                .current_site
                .as_ref()
                .and_then(|url| state.sites.get(url))
                .map(|pages| pages.len().saturating_sub(1))
                .unwrap_or(0);
            if state.current_page < last {
                state.current_page += 1;
            }
        }
        Ok(())
    }

    async fn text(&self, handle: &FakeElement) -> Result<String, AppError> {
        Ok(handle.text.clone())
    }

    async fn attribute(
        &self,
        handle: &FakeElement,
        name: &str,
    ) -> Result<Option<String>, AppError> {
        Ok(handle.attrs.get(name).cloned())
    }

    async fn evaluate(&self, script: &str) -> Result<(), AppError> {
        self.state.lock().unwrap().scripts.push(script.to_string());
        Ok(())
    }

    async fn sleep(&self, ms: u64) {
        self.state.lock().unwrap().slept_ms.push(ms);
    }
}

// ---------------------------------------------------------------------------
// NoDelay
// ---------------------------------------------------------------------------

/// Delay provider that records requested ranges and never sleeps.
#[derive(Clone, Default)]
pub struct NoDelay {
    requested: Arc<Mutex<Vec<(u64, u64)>>>,
}

impl NoDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requested(&self) -> Vec<(u64, u64)> {
        self.requested.lock().unwrap().clone()
    }
}

impl DelayProvider for NoDelay {
    async fn jitter(&self, min_ms: u64, max_ms: u64) {
        self.requested.lock().unwrap().push((min_ms, max_ms));
    }
}

// ---------------------------------------------------------------------------
// MockSink
// ---------------------------------------------------------------------------

/// Checkpoint sink that records every flush.
#[derive(Clone, Default)]
pub struct MockSink {
    pub flushed: Arc<Mutex<Vec<Vec<ScrapedEntity>>>>,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flush_count(&self) -> usize {
        self.flushed.lock().unwrap().len()
    }
}

impl CheckpointSink for MockSink {
    fn flush(&self, records: &[ScrapedEntity]) -> Result<(), AppError> {
        self.flushed.lock().unwrap().push(records.to_vec());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Scripted-page builders
// ---------------------------------------------------------------------------

/// A decodable review fragment with the given sub-elements.
pub fn fragment(title: &str, date: &str, text: &str, bubble_class: &str) -> FakeElement {
    FakeElement::text(text)
        .with_child(selectors::REVIEW_TITLE, FakeElement::text(title))
        .with_child(
            selectors::REVIEW_DATE,
            FakeElement::default().with_attr("title", date),
        )
        .with_child(
            selectors::REVIEW_RATING,
            FakeElement::default().with_attr("class", bubble_class),
        )
}

/// Pagination "next" control, enabled or marked disabled.
pub fn next_control(disabled: bool) -> FakeElement {
    let class = if disabled { "nav next disabled" } else { "nav next" };
    FakeElement::default()
        .with_attr("class", class)
        .with_role(ROLE_NEXT)
}

/// A listing page holding review fragments and, optionally, a "next"
/// control.
pub fn listing_page(fragments: Vec<FakeElement>, next: Option<FakeElement>) -> FakePage {
    let mut page = FakePage::default().with_all(selectors::REVIEW_FRAGMENT, fragments);
    if let Some(next) = next {
        page = page.with(selectors::NEXT_CONTROL, next);
    }
    page
}

/// An entity's first page: address, language filter, and review content.
pub fn entity_front_page(address: &str, mut listing: FakePage) -> FakePage {
    listing = listing.with(selectors::ADDRESS, FakeElement::text(address));
    listing.with(selectors::LANGUAGE_ALL, FakeElement::default())
}

use std::sync::Arc;
use std::time::{Duration, Instant};

use chromiumoxide::element::Element;
use chromiumoxide::{Browser, Page};

use pheme_core::{AppError, PageDriver};

use crate::browser::BrowserSession;

/// How long a navigation may take, end to end.
const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);
/// How long to keep polling `document.readyState` after navigation.
const READY_TIMEOUT: Duration = Duration::from_secs(10);
/// Tick for all polling loops (readiness and selector waits).
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// [`PageDriver`] over one chromiumoxide page.
///
/// Element lookups map the protocol's "no node found" error to `Ok(None)`:
/// absence is the expected case at every query site (consent banners,
/// filters, "next" controls), and genuine session faults still surface
/// from navigation, clicks, and reads.
#[derive(Clone)]
pub struct CdpDriver {
    // Held so the Chromium process outlives every clone of the driver.
    _browser: Arc<Browser>,
    page: Page,
}

impl CdpDriver {
    /// Launch a browser session and wrap its page.
    pub async fn launch(headless: bool) -> Result<Self, AppError> {
        let session = BrowserSession::launch(headless).await?;
        Ok(Self::from_session(session))
    }

    pub fn from_session(session: BrowserSession) -> Self {
        Self {
            _browser: session.browser,
            page: session.page,
        }
    }

    /// Poll until the document reports itself complete, or give up after
    /// [`READY_TIMEOUT`]. Best-effort: a page that never settles is still
    /// handed to the scrape.
    async fn wait_document_ready(&self) {
        let deadline = Instant::now() + READY_TIMEOUT;
        while Instant::now() < deadline {
            let ready = self
                .page
                .evaluate("document.readyState")
                .await
                .ok()
                .and_then(|result| result.value().cloned());
            if ready.as_ref().and_then(|v| v.as_str()) == Some("complete") {
                return;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
        tracing::debug!("document never reached readyState=complete");
    }

    async fn find(&self, selector: &str) -> Option<Element> {
        match self.page.find_element(selector).await {
            Ok(element) => Some(element),
            Err(e) => {
                tracing::trace!(selector, error = %e, "element not found");
                None
            }
        }
    }
}

impl PageDriver for CdpDriver {
    type Handle = Arc<Element>;

    async fn navigate(&self, url: &str) -> Result<(), AppError> {
        let navigation = async {
            self.page
                .goto(url)
                .await
                .map_err(|e| AppError::Navigation(format!("{url}: {e}")))?;
            self.page
                .wait_for_navigation()
                .await
                .map_err(|e| AppError::Navigation(format!("{url}: {e}")))?;
            self.wait_document_ready().await;
            Ok(())
        };

        match tokio::time::timeout(NAVIGATION_TIMEOUT, navigation).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Navigation(format!(
                "{url}: timed out after {}s",
                NAVIGATION_TIMEOUT.as_secs()
            ))),
        }
    }

    async fn query(&self, selector: &str) -> Result<Option<Arc<Element>>, AppError> {
        Ok(self.find(selector).await.map(Arc::new))
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<Arc<Element>>, AppError> {
        match self.page.find_elements(selector).await {
            Ok(elements) => Ok(elements.into_iter().map(Arc::new).collect()),
            Err(e) => {
                tracing::trace!(selector, error = %e, "no elements found");
                Ok(Vec::new())
            }
        }
    }

    async fn query_within(
        &self,
        handle: &Arc<Element>,
        selector: &str,
    ) -> Result<Option<Arc<Element>>, AppError> {
        match handle.find_element(selector).await {
            Ok(element) => Ok(Some(Arc::new(element))),
            Err(e) => {
                tracing::trace!(selector, error = %e, "descendant not found");
                Ok(None)
            }
        }
    }

    async fn wait_visible(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Option<Arc<Element>>, AppError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(element) = self.find(selector).await {
                return Ok(Some(Arc::new(element)));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn wait_hidden(&self, selector: &str, timeout: Duration) -> Result<bool, AppError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.find(selector).await.is_none() {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn click(&self, handle: &Arc<Element>) -> Result<(), AppError> {
        handle
            .click()
            .await
            .map(|_| ())
            .map_err(|e| AppError::Driver(format!("click failed: {e}")))
    }

    async fn text(&self, handle: &Arc<Element>) -> Result<String, AppError> {
        handle
            .inner_text()
            .await
            .map(|text| text.unwrap_or_default())
            .map_err(|e| AppError::Driver(format!("failed to read text: {e}")))
    }

    async fn attribute(
        &self,
        handle: &Arc<Element>,
        name: &str,
    ) -> Result<Option<String>, AppError> {
        handle
            .attribute(name)
            .await
            .map_err(|e| AppError::Driver(format!("failed to read attribute {name}: {e}")))
    }

    async fn evaluate(&self, script: &str) -> Result<(), AppError> {
        self.page
            .evaluate(script)
            .await
            .map(|_| ())
            .map_err(|e| AppError::Driver(format!("script evaluation failed: {e}")))
    }

    async fn sleep(&self, ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

use std::path::PathBuf;
use std::sync::Arc;

use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;

use pheme_core::AppError;

/// One Chromium process with a single long-lived page.
///
/// The whole scrape runs sequentially through this one page — entities and
/// their listing pages are visited one after another, which keeps the
/// session single-owner and avoids tripping pacing heuristics.
pub struct BrowserSession {
    pub browser: Arc<Browser>,
    pub page: Page,
}

impl BrowserSession {
    /// Launch Chromium and open the page the scrape will reuse.
    ///
    /// Requires a Chromium / Chrome binary reachable via `$PATH` (or the
    /// default locations checked by `chromiumoxide`). Pass
    /// `headless = false` to watch the scrape in a visible window.
    pub async fn launch(headless: bool) -> Result<Self, AppError> {
        let mut builder = BrowserConfig::builder();
        builder = builder.no_sandbox().disable_default_args();

        // Snap-packaged Chromium exposes a wrapper that rejects standard
        // Chrome CLI flags (--headless, --disable-gpu, …).  We try to
        // locate the *real* binary buried inside the snap, falling back
        // to any other Chrome/Chromium the user may have installed.
        if let Some(bin) = Self::find_chrome_binary() {
            tracing::info!("Using Chrome binary: {}", bin.display());
            builder = builder.chrome_executable(bin);
        }

        if headless {
            builder = builder.arg("--headless=new");
        } else {
            builder = builder.with_head();
        }

        let config = builder
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-popup-blocking")
            .arg("--disable-translate")
            .arg("--no-first-run")
            .build()
            .map_err(|e| AppError::Driver(format!("Browser config error: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| AppError::Driver(format!("Failed to launch browser: {e}")))?;

        // The CDP handler must be polled continuously for the connection to work.
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    tracing::warn!("Browser CDP handler error: {event:?}");
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| AppError::Driver(format!("Failed to open page: {e}")))?;

        Ok(Self {
            browser: Arc::new(browser),
            page,
        })
    }

    /// Tries to locate the real Chrome/Chromium binary.
    ///
    /// On systems where Chromium is installed via **snap**, the wrapper at
    /// `/snap/bin/chromium` strips unknown CLI flags, breaking headless
    /// mode. We look for the real binary inside the snap first, then fall
    /// back to well-known system paths. If nothing is found we return
    /// `None` and let `chromiumoxide` do its own lookup.
    fn find_chrome_binary() -> Option<PathBuf> {
        let candidates: &[&str] = &[
            // Snap (Ubuntu default)
            "/snap/chromium/current/usr/lib/chromium-browser/chrome",
            // Flatpak
            "/var/lib/flatpak/exports/bin/org.chromium.Chromium",
            // Common apt / manual installs
            "/usr/bin/google-chrome-stable",
            "/usr/bin/google-chrome",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
        ];

        // Also honour an explicit override via env var.
        if let Ok(p) = std::env::var("CHROME_BIN") {
            let path = PathBuf::from(&p);
            if path.exists() {
                return Some(path);
            }
        }

        candidates.iter().map(PathBuf::from).find(|p| p.exists())
    }
}

//! Chromium-backed session using chromiumoxide.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use rand::Rng;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{ExpandResult, Session};
use crate::config::ScrapeConfig;
use crate::error::SessionError;

/// The AJAX-backed "More" control at the bottom of the review list.
const MORE_BUTTON_SELECTOR: &str = "#next-button > a.page-link";

/// Counts `div.review` blocks to detect content growth after a click.
const REVIEW_COUNT_JS: &str = "document.querySelectorAll('div.review').length";

/// Poll interval while waiting for the DOM to settle.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// A common desktop user agent; the aggregator serves a degraded page to
/// obvious automation.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/118.0.0.0 Safari/537.36";

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. TISCRAPE_CHROMIUM_PATH env
    if let Ok(p) = std::env::var("TISCRAPE_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. ~/.tiscrape/chromium/
    if let Some(home) = dirs::home_dir() {
        let candidates = if cfg!(target_os = "macos") {
            vec![
                home.join(".tiscrape/chromium/chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".tiscrape/chromium/chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".tiscrape/chromium/chrome"),
            ]
        } else {
            vec![
                home.join(".tiscrape/chromium/chrome-linux64/chrome"),
                home.join(".tiscrape/chromium/chrome"),
            ]
        };
        for c in candidates {
            if c.exists() {
                return Some(c);
            }
        }
    }

    // 3. System PATH
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 4. Common macOS location
    if cfg!(target_os = "macos") {
        let common = PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// A live Chromium session pointed at one review page.
pub struct ChromiumSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    settle_timeout: Duration,
}

impl ChromiumSession {
    /// Launch Chromium and load the review page.
    ///
    /// Fails with [`SessionError`] if the browser cannot be launched or the
    /// page does not load within `cfg.nav_timeout`. On failure the browser
    /// is torn down before returning; on success the caller owns the
    /// session and must `close()` it on every exit path.
    pub async fn open(cfg: &ScrapeConfig) -> Result<Self, SessionError> {
        let chrome_path = find_chromium().ok_or_else(|| {
            SessionError::Launch(
                "Chromium not found. Install Chrome/Chromium or set TISCRAPE_CHROMIUM_PATH"
                    .to_string(),
            )
        })?;

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .window_size(1920, 1200)
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-blink-features=AutomationControlled")
            .arg(format!("--user-agent={USER_AGENT}"));
        if !cfg.headless {
            builder = builder.with_head();
        }
        let browser_config = builder.build().map_err(SessionError::Launch)?;

        let (browser, mut handler) = Browser::launch(browser_config).await?;

        // Drain CDP events for the lifetime of the browser.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                teardown(browser, None, handler_task).await;
                return Err(SessionError::Protocol(e));
            }
        };

        let session = Self {
            browser,
            page,
            handler_task,
            settle_timeout: cfg.settle_timeout,
        };

        if let Err(e) = session.navigate(cfg).await {
            session.shutdown().await;
            return Err(e);
        }
        Ok(session)
    }

    async fn navigate(&self, cfg: &ScrapeConfig) -> Result<(), SessionError> {
        info!(url = %cfg.url, "loading review page");
        match tokio::time::timeout(cfg.nav_timeout, self.page.goto(cfg.url.clone())).await {
            Ok(Ok(_)) => {
                let _ = self.page.wait_for_navigation().await;
            }
            Ok(Err(e)) => {
                return Err(SessionError::Navigation {
                    url: cfg.url.clone(),
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                return Err(SessionError::Navigation {
                    url: cfg.url.clone(),
                    reason: format!("timed out after {:?}", cfg.nav_timeout),
                })
            }
        }

        // Content-ready wait: the review list is rendered client-side and
        // arrives after the navigation settles. Timing out here is not
        // fatal — an empty snapshot extracts to an empty record set.
        let deadline = Instant::now() + cfg.nav_timeout;
        loop {
            if self.review_count().await.unwrap_or(0) > 0 {
                return Ok(());
            }
            if Instant::now() >= deadline {
                warn!("no review blocks appeared within the bounded wait");
                return Ok(());
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn review_count(&self) -> Result<usize, SessionError> {
        let result = self.page.evaluate(REVIEW_COUNT_JS).await?;
        result
            .into_value::<usize>()
            .map_err(|e| SessionError::Script(format!("review count: {e:?}")))
    }

    async fn shutdown(self) {
        let ChromiumSession {
            browser,
            page,
            handler_task,
            ..
        } = self;
        teardown(browser, Some(page), handler_task).await;
    }
}

async fn teardown(mut browser: Browser, page: Option<Page>, handler_task: JoinHandle<()>) {
    if let Some(page) = page {
        let _ = page.close().await;
    }
    let _ = browser.close().await;
    let _ = browser.wait().await;
    handler_task.abort();
}

#[async_trait]
impl Session for ChromiumSession {
    async fn snapshot(&mut self) -> Result<String, SessionError> {
        let result = self
            .page
            .evaluate("document.documentElement.outerHTML")
            .await?;
        result
            .into_value::<String>()
            .map_err(|e| SessionError::Script(format!("outerHTML: {e:?}")))
    }

    async fn expand(&mut self) -> Result<ExpandResult, SessionError> {
        // Politeness jitter so repeated clicks don't fire machine-regular.
        let jitter = Duration::from_millis(rand::thread_rng().gen_range(400..1200));
        tokio::time::sleep(jitter).await;

        let button = match self.page.find_element(MORE_BUTTON_SELECTOR).await {
            Ok(el) => el,
            Err(_) => {
                debug!("expansion control absent");
                return Ok(ExpandResult::NoMoreContent);
            }
        };

        let before = self.review_count().await.unwrap_or(0);

        let _ = button.scroll_into_view().await;
        if button.click().await.is_err() {
            // Direct click intercepted or the element went stale.
            // Re-find and click from inside the page instead.
            debug!("direct click failed, falling back to JS click");
            match self.page.find_element(MORE_BUTTON_SELECTOR).await {
                Ok(el) => {
                    if el.call_js_fn("function() { this.click(); }", false).await.is_err() {
                        warn!("JS click fallback failed, treating as end of content");
                        return Ok(ExpandResult::NoMoreContent);
                    }
                }
                Err(_) => return Ok(ExpandResult::NoMoreContent),
            }
        }

        // Wait for the review count to grow past the pre-click count.
        let deadline = Instant::now() + self.settle_timeout;
        loop {
            tokio::time::sleep(POLL_INTERVAL).await;
            let now = self.review_count().await.unwrap_or(before);
            if now > before {
                debug!(before, now, "review count grew after click");
                return Ok(ExpandResult::Expanded);
            }
            if Instant::now() >= deadline {
                break;
            }
        }

        // No growth. A vanished control means the source is done; a control
        // that is still there but yielded nothing is a settle timeout.
        match self.page.find_element(MORE_BUTTON_SELECTOR).await {
            Ok(_) => {
                debug!("review count did not grow, control still present");
                Ok(ExpandResult::Timeout)
            }
            Err(_) => {
                debug!("review count did not grow and control disappeared");
                Ok(ExpandResult::NoMoreContent)
            }
        }
    }

    async fn close(self: Box<Self>) -> Result<(), SessionError> {
        self.shutdown().await;
        info!("browser closed");
        Ok(())
    }
}

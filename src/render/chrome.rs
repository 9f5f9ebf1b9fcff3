//! Headless Chrome rendering engine
//!
//! `headless_chrome` exposes a blocking API, so every browser call runs on
//! the blocking thread pool. A browser process is launched per scrape run and
//! torn down with it; each listing or detail page is one tab.

use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use tokio::task;
use tracing::{debug, warn};

use crate::errors::{AppResult, ScrapeError};
use crate::render::{RenderBrowser, RenderEngine, RenderSession};

/// Factory for per-run Chrome processes
#[derive(Debug, Clone)]
pub struct ChromeEngine {
    nav_timeout: Duration,
}

impl ChromeEngine {
    pub fn new(nav_timeout: Duration) -> Self {
        Self { nav_timeout }
    }
}

#[async_trait]
impl RenderEngine for ChromeEngine {
    type Browser = ChromeBrowser;

    async fn launch(&self) -> AppResult<ChromeBrowser> {
        let browser = task::spawn_blocking(|| -> Result<Browser, anyhow::Error> {
            let options = LaunchOptions::default_builder()
                .headless(true)
                .sandbox(false)
                .args(vec![
                    OsStr::new("--disable-dev-shm-usage"),
                    OsStr::new("--disable-gpu"),
                ])
                .build()
                .map_err(|e| anyhow::anyhow!("{e}"))?;
            Browser::new(options)
        })
        .await
        .map_err(|e| ScrapeError::launch(e.to_string()))?
        .map_err(|e| ScrapeError::launch(e.to_string()))?;

        debug!("Chrome launched");
        Ok(ChromeBrowser {
            browser,
            nav_timeout: self.nav_timeout,
        })
    }
}

/// One running Chrome process
pub struct ChromeBrowser {
    browser: Browser,
    nav_timeout: Duration,
}

#[async_trait]
impl RenderBrowser for ChromeBrowser {
    type Session = ChromeSession;

    async fn new_session(&self) -> AppResult<ChromeSession> {
        let browser = self.browser.clone();
        let nav_timeout = self.nav_timeout;
        let tab = task::spawn_blocking(move || {
            let tab = browser.new_tab()?;
            tab.set_default_timeout(nav_timeout);
            Ok::<_, anyhow::Error>(tab)
        })
        .await
        .map_err(|e| ScrapeError::launch(e.to_string()))?
        .map_err(|e| ScrapeError::launch(e.to_string()))?;

        Ok(ChromeSession { tab })
    }

    async fn close(self) {
        // Dropping the last Browser clone kills the Chrome process.
        let browser = self.browser;
        let _ = task::spawn_blocking(move || drop(browser)).await;
        debug!("Chrome closed");
    }
}

/// One open tab
pub struct ChromeSession {
    tab: Arc<Tab>,
}

#[async_trait]
impl RenderSession for ChromeSession {
    async fn navigate(&self, url: &str) -> AppResult<()> {
        let tab = self.tab.clone();
        let target = url.to_string();
        let nav = task::spawn_blocking(move || -> Result<(), anyhow::Error> {
            tab.navigate_to(&target)?;
            tab.wait_until_navigated()?;
            Ok(())
        })
        .await
        .map_err(|e| ScrapeError::navigation(url, e.to_string()))?;

        nav.map_err(|e| ScrapeError::navigation(url, e.to_string()).into())
    }

    async fn scroll_by(&self, step: u32) -> AppResult<u64> {
        let tab = self.tab.clone();
        let height = task::spawn_blocking(move || -> Result<u64, anyhow::Error> {
            let expression =
                format!("window.scrollBy(0, {step}); document.body.scrollHeight");
            let result = tab.evaluate(&expression, false)?;
            result
                .value
                .and_then(|v| v.as_u64())
                .ok_or_else(|| anyhow::anyhow!("scrollHeight did not evaluate to a number"))
        })
        .await
        .map_err(|e| ScrapeError::evaluation(e.to_string()))?;

        height.map_err(|e| ScrapeError::evaluation(e.to_string()).into())
    }

    async fn content(&self) -> AppResult<String> {
        let tab = self.tab.clone();
        let html = task::spawn_blocking(move || tab.get_content())
            .await
            .map_err(|e| ScrapeError::evaluation(e.to_string()))?;

        html.map_err(|e| ScrapeError::evaluation(e.to_string()).into())
    }

    async fn close(self) {
        let tab = self.tab;
        let result = task::spawn_blocking(move || tab.close(true)).await;
        if let Ok(Err(e)) = result {
            warn!("Tab close failed: {}", e);
        }
    }
}

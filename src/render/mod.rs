//! Rendering seam
//!
//! The scraper drives pages through these traits only, so the pipeline and
//! its tests are independent of the engine that actually renders markup.
//! [`chrome`] provides the production implementation.

pub mod chrome;

use async_trait::async_trait;

use crate::errors::AppResult;

/// Launches one rendering run per scrape job
#[async_trait]
pub trait RenderEngine: Send + Sync + 'static {
    type Browser: RenderBrowser;

    async fn launch(&self) -> AppResult<Self::Browser>;
}

/// A live rendering run; hands out page sessions
#[async_trait]
pub trait RenderBrowser: Send + Sync {
    type Session: RenderSession;

    async fn new_session(&self) -> AppResult<Self::Session>;

    /// Best-effort teardown; must be called on every exit path.
    async fn close(self);
}

/// One open page within a rendering run
#[async_trait]
pub trait RenderSession: Send + Sync {
    async fn navigate(&self, url: &str) -> AppResult<()>;

    /// Scroll down by `step` pixels; returns the current document height.
    async fn scroll_by(&self, step: u32) -> AppResult<u64>;

    /// Full rendered HTML of the page as it currently stands.
    async fn content(&self) -> AppResult<String>;

    /// Best-effort teardown; must be called on every exit path.
    async fn close(self);
}

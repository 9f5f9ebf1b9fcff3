//! Scrape pipeline
//!
//! One run per section walks Navigating → ScrollingToExhaustion → Extracting
//! → Enriching → Localizing. Navigation failures kill the section's run; all
//! later stages degrade per record instead of failing the run. The rendering
//! engine is released on every exit path.

pub mod detail;
pub mod listing;

use std::time::Duration;

use chrono::NaiveDate;
use futures::future::join_all;
use tracing::{error, info};

use crate::assets::{ImageCategory, ImageLocalizer};
use crate::cache::CacheKey;
use crate::config::ScrapeConfig;
use crate::errors::{AppResult, ScrapeError};
use crate::models::{MatchRecord, RawMatch};
use crate::render::{RenderBrowser, RenderEngine, RenderSession};

/// One of the three listing views scraped independently
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Now,
    Today,
    Tomorrow,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Now => "now",
            Self::Today => "today",
            Self::Tomorrow => "tomorrow",
        }
    }

    pub fn listing_path(&self) -> &'static str {
        match self {
            Self::Now => "/jogos-aovivo/",
            Self::Today => "/jogos-hoje/",
            Self::Tomorrow => "/jogos-amanha/",
        }
    }

    /// Cache key for this section relative to the site's current date.
    pub fn cache_key(&self, today: NaiveDate) -> CacheKey {
        match self {
            Self::Now => CacheKey::Now,
            Self::Today => CacheKey::Day(today),
            Self::Tomorrow => CacheKey::Day(today + chrono::Duration::days(1)),
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drives one full scrape of a section into finished match records
pub struct ScrapeOrchestrator<E: RenderEngine> {
    engine: E,
    localizer: ImageLocalizer,
    base_url: String,
    scroll_step: u32,
    settle_delay: Duration,
    detail_concurrency: usize,
}

impl<E: RenderEngine> ScrapeOrchestrator<E> {
    pub fn new(engine: E, localizer: ImageLocalizer, config: &ScrapeConfig) -> Self {
        Self {
            engine,
            localizer,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            scroll_step: config.scroll_step,
            settle_delay: Duration::from_secs(config.settle_delay_secs),
            detail_concurrency: config.detail_concurrency.max(1),
        }
    }

    /// Scrape one section to completion, or fail it atomically.
    pub async fn scrape_section(&self, section: Section) -> AppResult<Vec<MatchRecord>> {
        info!("Starting scrape for section '{}'", section);

        let browser = self.engine.launch().await?;
        let result = self.run_stages(&browser, section).await;
        browser.close().await;

        match result {
            Ok(records) => {
                info!(
                    "Scrape finished for section '{}': {} matches",
                    section,
                    records.len()
                );
                Ok(records)
            }
            Err(e) => {
                error!("Scrape failed for section '{}': {}", section, e);
                Err(ScrapeError::SectionFailed {
                    section: section.to_string(),
                }
                .into())
            }
        }
    }

    async fn run_stages(
        &self,
        browser: &E::Browser,
        section: Section,
    ) -> AppResult<Vec<MatchRecord>> {
        let url = format!("{}{}", self.base_url, section.listing_path());

        let page = browser.new_session().await?;
        let rendered = self.render_listing(&page, &url).await;
        page.close().await;
        let html = rendered?;

        let mut raw = listing::extract_listing(&html, &self.base_url);
        self.enrich(browser, &mut raw).await;

        // Assembly drops the internal detail link regardless of enrichment
        // outcome; the public record type has no field for it.
        let mut records: Vec<MatchRecord> = raw.into_iter().map(|m| m.record).collect();
        self.localize_images(&mut records).await;

        Ok(records)
    }

    /// Navigating and ScrollingToExhaustion, then a content capture.
    async fn render_listing<S: RenderSession>(&self, page: &S, url: &str) -> AppResult<String> {
        page.navigate(url).await?;

        let mut scrolled: u64 = 0;
        loop {
            let height = page.scroll_by(self.scroll_step).await?;
            scrolled += u64::from(self.scroll_step);
            if scrolled >= height {
                break;
            }
        }
        tokio::time::sleep(self.settle_delay).await;

        page.content().await
    }

    /// Detail-page enrichment in fixed-width batches. A batch is awaited in
    /// full before the next one starts, bounding simultaneous sessions.
    async fn enrich(&self, browser: &E::Browser, raw: &mut [RawMatch]) {
        for batch in raw.chunks_mut(self.detail_concurrency) {
            join_all(batch.iter_mut().map(|m| async move {
                if let Some(detail_url) = m.detail_url.take() {
                    let (home, away) =
                        detail::fetch_emblems(browser, &detail_url, &self.base_url).await;
                    m.record.home.emblem_url = home;
                    m.record.away.emblem_url = away;
                }
            }))
            .await;
        }
    }

    /// Sequential image localization; failures fall back to the remote URL.
    async fn localize_images(&self, records: &mut [MatchRecord]) {
        for record in records.iter_mut() {
            if let Some(url) = record.competition.emblem_url.take() {
                record.competition.emblem_url =
                    Some(self.localizer.localize(&url, ImageCategory::Countries).await);
            }
            if let Some(url) = record.home.emblem_url.take() {
                record.home.emblem_url =
                    Some(self.localizer.localize(&url, ImageCategory::Teams).await);
            }
            if let Some(url) = record.away.emblem_url.take() {
                record.away.emblem_url =
                    Some(self.localizer.localize(&url, ImageCategory::Teams).await);
            }
            for channel in &mut record.channels {
                if let Some(url) = channel.icon_url.take() {
                    channel.icon_url =
                        Some(self.localizer.localize(&url, ImageCategory::Channels).await);
                }
            }
        }
    }
}

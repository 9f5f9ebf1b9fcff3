//! Refresh scheduling
//!
//! Three jobs keep the cache warm: a daily refresh of the today/tomorrow
//! entries, a minutely refresh of the live entry, and a daily retention
//! purge. Every job also runs once at startup so the first request after a
//! deploy finds a populated cache. Cadences are cron expressions evaluated
//! in the site's timezone on a coarse tick, against each job's last run.

use std::collections::HashSet;
use std::str::FromStr;

use chrono::{DateTime, Duration as ChronoDuration};
use chrono_tz::Tz;
use cron::Schedule;
use tokio::time::{Duration, interval};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::cache::{CacheKey, CacheStore};
use crate::config::ScheduleConfig;
use crate::errors::{AppError, AppResult};
use crate::render::RenderEngine;
use crate::scrape::{ScrapeOrchestrator, Section};

const TICK: Duration = Duration::from_secs(30);

/// One cron cadence with last-run tracking
struct CronJob {
    name: &'static str,
    schedule: Schedule,
    last_run: DateTime<Tz>,
}

impl CronJob {
    fn new(name: &'static str, expression: &str, now: DateTime<Tz>) -> AppResult<Self> {
        let schedule = Schedule::from_str(expression).map_err(|e| {
            AppError::configuration(format!("Invalid cron expression '{expression}': {e}"))
        })?;
        Ok(Self {
            name,
            schedule,
            last_run: now,
        })
    }

    /// Due when a scheduled fire time has passed since the last run.
    fn due(&self, now: DateTime<Tz>) -> bool {
        match self.schedule.after(&self.last_run).next() {
            Some(next) => now >= next,
            None => false,
        }
    }

    fn mark_run(&mut self, now: DateTime<Tz>) {
        self.last_run = now;
    }
}

/// Drives scrape and purge jobs on their cadences
pub struct RefreshScheduler<E: RenderEngine> {
    orchestrator: ScrapeOrchestrator<E>,
    cache: CacheStore,
    tz: Tz,
    daily: CronJob,
    live: CronJob,
    purge: CronJob,
}

impl<E: RenderEngine> RefreshScheduler<E> {
    pub fn new(
        orchestrator: ScrapeOrchestrator<E>,
        cache: CacheStore,
        config: &ScheduleConfig,
        tz: Tz,
    ) -> AppResult<Self> {
        let now = chrono::Utc::now().with_timezone(&tz);
        Ok(Self {
            orchestrator,
            cache,
            tz,
            daily: CronJob::new("daily refresh", &config.daily_cron, now)?,
            live: CronJob::new("live refresh", &config.live_cron, now)?,
            purge: CronJob::new("retention purge", &config.purge_cron, now)?,
        })
    }

    /// Scrape one section and replace its cache entry.
    ///
    /// Safe to race with a cadence-triggered run for the same section; the
    /// cache write is a whole-entry replace, so the last writer wins.
    pub async fn run_now(&self, section: Section) -> AppResult<()> {
        let today = chrono::Utc::now().with_timezone(&self.tz).date_naive();
        let key = section.cache_key(today);
        let records = self.orchestrator.scrape_section(section).await?;
        self.cache.put(&key, &records).await?;
        Ok(())
    }

    /// Run until cancelled. Fires every job once at startup as cache warm-up.
    pub async fn run(mut self, cancel: CancellationToken) {
        info!(
            "Scheduler started: {}, {}, {}",
            self.daily.name, self.live.name, self.purge.name
        );

        info!("Running startup cache warm-up");
        self.refresh_daily().await;
        self.refresh_live().await;
        self.purge_stale().await;

        let mut tick = interval(TICK);
        tick.tick().await;

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let now = chrono::Utc::now().with_timezone(&self.tz);
                    if self.daily.due(now) {
                        self.refresh_daily().await;
                        self.daily.mark_run(now);
                    }
                    if self.live.due(now) {
                        self.refresh_live().await;
                        self.live.mark_run(now);
                    }
                    if self.purge.due(now) {
                        self.purge_stale().await;
                        self.purge.mark_run(now);
                    }
                }
                _ = cancel.cancelled() => {
                    info!("Scheduler received shutdown signal, stopping");
                    break;
                }
            }
        }
    }

    /// Refresh the date-keyed entries. Sections fail independently; a dead
    /// render for today must not cost us tomorrow's entry.
    async fn refresh_daily(&self) {
        for section in [Section::Today, Section::Tomorrow] {
            if let Err(e) = self.run_now(section).await {
                error!("Daily refresh failed for section '{}': {}", section, e);
            }
        }
    }

    async fn refresh_live(&self) {
        if let Err(e) = self.run_now(Section::Now).await {
            error!("Live refresh failed: {}", e);
        }
    }

    async fn purge_stale(&self) {
        let keep = retention_keep_set(chrono::Utc::now().with_timezone(&self.tz));
        match self.cache.purge_except(&keep).await {
            Ok(removed) if removed > 0 => info!("Retention purge removed {} entries", removed),
            Ok(_) => {}
            Err(e) => warn!("Retention purge failed: {}", e),
        }
    }
}

/// File names exempt from purge: the live entry plus a one-day window either
/// side of the purge-time date.
fn retention_keep_set(now: DateTime<Tz>) -> HashSet<String> {
    let today = now.date_naive();
    let yesterday = today - ChronoDuration::days(1);
    let tomorrow = today + ChronoDuration::days(1);

    [
        CacheKey::Now,
        CacheKey::Day(yesterday),
        CacheKey::Day(today),
        CacheKey::Day(tomorrow),
    ]
    .into_iter()
    .map(|key| key.file_name())
    .collect()
}

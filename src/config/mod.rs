use anyhow::Result;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub scrape: ScrapeConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Origin of the listing site; section paths are joined onto this
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Timezone the source site keys its listing days by
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Detail-page enrichment batch width
    #[serde(default = "default_detail_concurrency")]
    pub detail_concurrency: usize,
    /// Pixels per scroll step while exhausting the listing page
    #[serde(default = "default_scroll_step")]
    pub scroll_step: u32,
    /// Settle time after scrolling, for lazy-loaded cards
    #[serde(default = "default_settle_delay_secs")]
    pub settle_delay_secs: u64,
    /// Per-navigation timeout; a hung render is bounded only by this
    #[serde(default = "default_nav_timeout_secs")]
    pub nav_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one `<key>.json` document per cache entry
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
    /// Root directory for localized images, split by category
    #[serde(default = "default_image_root")]
    pub image_root: PathBuf,
    /// Public URL prefix under which `image_root` is served
    #[serde(default = "default_public_base")]
    pub public_base: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Daily refresh of the today/tomorrow entries
    #[serde(default = "default_daily_cron")]
    pub daily_cron: String,
    /// Live-section refresh cadence
    #[serde(default = "default_live_cron")]
    pub live_cron: String,
    /// Retention purge cadence
    #[serde(default = "default_purge_cron")]
    pub purge_cron: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_base_url() -> String {
    "https://www.futebolnatv.com.br".to_string()
}

fn default_timezone() -> String {
    "America/Sao_Paulo".to_string()
}

fn default_detail_concurrency() -> usize {
    4
}

fn default_scroll_step() -> u32 {
    100
}

fn default_settle_delay_secs() -> u64 {
    3
}

fn default_nav_timeout_secs() -> u64 {
    120
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("./cache")
}

fn default_image_root() -> PathBuf {
    PathBuf::from("./public")
}

fn default_public_base() -> String {
    "/public".to_string()
}

fn default_daily_cron() -> String {
    // 00:01 site time
    "0 1 0 * * *".to_string()
}

fn default_live_cron() -> String {
    // every minute
    "0 * * * * *".to_string()
}

fn default_purge_cron() -> String {
    // 00:05 site time
    "0 5 0 * * *".to_string()
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timezone: default_timezone(),
            detail_concurrency: default_detail_concurrency(),
            scroll_step: default_scroll_step(),
            settle_delay_secs: default_settle_delay_secs(),
            nav_timeout_secs: default_nav_timeout_secs(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            image_root: default_image_root(),
            public_base: default_public_base(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            daily_cron: default_daily_cron(),
            live_cron: default_live_cron(),
            purge_cron: default_purge_cron(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            web: WebConfig::default(),
            scrape: ScrapeConfig::default(),
            storage: StorageConfig::default(),
            schedule: ScheduleConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_from_file(&config_file)
    }

    pub fn load_from_file(config_file: &str) -> Result<Self> {
        if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(config_file)?;
            Ok(toml::from_str(&contents)?)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file);
            Ok(default_config)
        }
    }
}

impl ScrapeConfig {
    pub fn site_timezone(&self) -> AppResult<Tz> {
        self.timezone.parse::<Tz>().map_err(|_| {
            AppError::configuration(format!("Invalid timezone '{}'", self.timezone))
        })
    }
}

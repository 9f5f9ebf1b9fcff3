//! Image localization
//!
//! Downloads competition, team, and channel artwork once and republishes it
//! under a local, category-split path so the API never leaks hotlinked
//! third-party image URLs. Downloads are keyed by the source URL's path
//! basename and skipped when the destination file already exists.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, REFERER, USER_AGENT};
use tokio::fs;
use tracing::{debug, warn};

use crate::config::{ScrapeConfig, StorageConfig};
use crate::errors::AppResult;
use crate::utils::url::path_basename;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120 Safari/537.36";
const IMAGE_ACCEPT: &str = "image/avif,image/webp,image/apng,image/*,*/*;q=0.8";
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Category subdirectory a localized image lands in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageCategory {
    /// Competition emblems
    Countries,
    /// Team emblems
    Teams,
    /// Broadcast channel icons
    Channels,
}

impl ImageCategory {
    pub fn dir(&self) -> &'static str {
        match self {
            Self::Countries => "countries",
            Self::Teams => "teams",
            Self::Channels => "channels",
        }
    }
}

/// Downloads remote images into the published image tree
#[derive(Debug, Clone)]
pub struct ImageLocalizer {
    client: reqwest::Client,
    image_root: PathBuf,
    public_base: String,
}

impl ImageLocalizer {
    pub fn new(scrape: &ScrapeConfig, storage: &StorageConfig) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static(IMAGE_ACCEPT));
        if let Ok(referer) = HeaderValue::from_str(&scrape.base_url) {
            headers.insert(REFERER, referer);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(FETCH_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            image_root: storage.image_root.clone(),
            public_base: storage.public_base.trim_end_matches('/').to_string(),
        })
    }

    /// Localize one image and return the URL to publish for it.
    ///
    /// Returns the local public URL on success or when the file is already
    /// present; falls back to the remote URL itself on any failure, so a dead
    /// image host never aborts a scrape.
    pub async fn localize(&self, source_url: &str, category: ImageCategory) -> String {
        match self.try_localize(source_url, category).await {
            Ok(public_url) => public_url,
            Err(e) => {
                warn!("Image fetch failed for {}: {}", source_url, e);
                source_url.to_string()
            }
        }
    }

    async fn try_localize(&self, source_url: &str, category: ImageCategory) -> AppResult<String> {
        let file_name = path_basename(source_url).ok_or_else(|| {
            crate::errors::AppError::internal(format!("No file name in image URL {source_url}"))
        })?;

        let dest_dir = self.image_root.join(category.dir());
        let dest = dest_dir.join(&file_name);
        fs::create_dir_all(&dest_dir).await?;

        if fs::try_exists(&dest).await? {
            debug!("Image already localized: {}", dest.display());
        } else {
            let response = self.client.get(source_url).send().await?;
            let status = response.status();
            if !(status.is_success() || status.is_redirection()) {
                return Err(crate::errors::AppError::internal(format!(
                    "HTTP {status} fetching {source_url}"
                )));
            }
            let bytes = response.bytes().await?;
            fs::write(&dest, &bytes).await?;
            debug!("Image saved: {}", dest.display());
        }

        Ok(format!(
            "{}/{}/{}",
            self.public_base,
            category.dir(),
            file_name
        ))
    }
}

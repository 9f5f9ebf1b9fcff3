//! Time-keyed on-disk cache of match listings
//!
//! One JSON document per logical key (`now` or an ISO date). Writes land in a
//! temporary file first and are renamed into place, so a reader either sees
//! the previous complete document or the new one, never a partial write.

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use tempfile::NamedTempFile;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::errors::{AppError, AppResult, CacheError};
use crate::models::MatchRecord;

/// Logical cache identifier: the live view or one listing day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Now,
    Day(NaiveDate),
}

impl CacheKey {
    pub fn file_name(&self) -> String {
        format!("{self}.json")
    }

    /// Parse an externally supplied key: `now` or `YYYY-MM-DD`.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw == "now" {
            return Some(Self::Now);
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().map(Self::Day)
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Now => write!(f, "now"),
            Self::Day(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

/// A cache entry as read back for serving
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub records: Vec<MatchRecord>,
    pub last_modified: DateTime<Utc>,
}

/// Filesystem-backed key-value store for match listings
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub async fn new(dir: impl Into<PathBuf>) -> AppResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    /// Replace the entry for `key` with `records`, atomically.
    pub async fn put(&self, key: &CacheKey, records: &[MatchRecord]) -> AppResult<()> {
        let bytes = serde_json::to_vec_pretty(records).map_err(CacheError::Serialization)?;
        let dir = self.dir.clone();
        let path = self.entry_path(key);
        let key_name = key.to_string();

        // The temp file has no `.json` extension, so the purge job never
        // considers it.
        let write = tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let mut tmp = NamedTempFile::new_in(&dir)?;
            tmp.write_all(&bytes)?;
            tmp.persist(&path).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| AppError::internal(format!("Cache write task failed: {e}")))?;

        write.map_err(|e| {
            AppError::Cache(CacheError::WriteFailed {
                key: key_name.clone(),
                message: e.to_string(),
            })
        })?;

        info!("Cache entry written for key '{}'", key_name);
        Ok(())
    }

    /// Read the entry for `key`; missing and unreadable entries look the same.
    pub async fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        let path = self.entry_path(key);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(_) => return None,
        };
        let records: Vec<MatchRecord> = match serde_json::from_slice(&bytes) {
            Ok(records) => records,
            Err(e) => {
                warn!("Discarding unreadable cache entry '{}': {}", key, e);
                return None;
            }
        };
        let last_modified = match fs::metadata(&path).await.and_then(|m| m.modified()) {
            Ok(mtime) => DateTime::<Utc>::from(mtime),
            Err(_) => return None,
        };
        Some(CacheEntry {
            records,
            last_modified,
        })
    }

    /// Delete every `*.json` entry whose file name is not in `keep`.
    ///
    /// Returns the number of entries removed.
    pub async fn purge_except(&self, keep: &HashSet<String>) -> AppResult<usize> {
        let mut dir = fs::read_dir(&self.dir).await.map_err(|e| {
            AppError::Cache(CacheError::PurgeFailed {
                message: e.to_string(),
            })
        })?;

        let mut removed = 0;
        loop {
            let entry = match dir.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!("Purge pass stopped early: {}", e);
                    break;
                }
            };
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if keep.contains(file_name) {
                continue;
            }
            match fs::remove_file(&path).await {
                Ok(()) => {
                    info!("Purged stale cache entry: {}", file_name);
                    removed += 1;
                }
                Err(e) => warn!("Could not purge cache entry {}: {}", file_name, e),
            }
        }

        debug!("Purge pass removed {} entries", removed);
        Ok(removed)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

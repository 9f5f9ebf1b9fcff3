//! Error type definitions for the matchday application
//!
//! This module defines all error types used throughout the application,
//! providing a hierarchical error system that makes debugging and error
//! handling more straightforward.

use thiserror::Error;

/// Top-level application error type
///
/// This enum represents all possible errors that can occur in the application.
/// It uses `thiserror` to provide automatic error trait implementations and
/// proper error chaining.
#[derive(Error, Debug)]
pub enum AppError {
    /// Scraping pipeline errors
    #[error("Scrape error: {0}")]
    Scrape(#[from] ScrapeError),

    /// Cache persistence errors
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Scraping pipeline specific errors
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// Rendering engine could not be launched
    #[error("Failed to launch rendering engine: {message}")]
    Launch { message: String },

    /// Page navigation failures (unreachable, timed out)
    #[error("Navigation failed for {url}: {message}")]
    Navigation { url: String, message: String },

    /// In-page evaluation failures (scroll, content capture)
    #[error("Render evaluation failed: {message}")]
    Evaluation { message: String },

    /// A whole section scrape failed; other sections are unaffected
    #[error("Scrape failed for section '{section}'")]
    SectionFailed { section: String },
}

/// Cache persistence specific errors
#[derive(Error, Debug)]
pub enum CacheError {
    /// Entry serialization failures
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Entry write failures (disk error, rename failure)
    #[error("Write failed for key '{key}': {message}")]
    WriteFailed { key: String, message: String },

    /// Purge pass failures (directory unreadable)
    #[error("Purge failed: {message}")]
    PurgeFailed { message: String },
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl ScrapeError {
    pub fn launch<S: Into<String>>(message: S) -> Self {
        Self::Launch {
            message: message.into(),
        }
    }

    pub fn navigation<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::Navigation {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn evaluation<S: Into<String>>(message: S) -> Self {
        Self::Evaluation {
            message: message.into(),
        }
    }
}

/// Result type alias using the application error type
pub type AppResult<T> = Result<T, AppError>;

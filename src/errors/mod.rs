//! Error handling for the matchday application

pub mod types;

pub use types::{AppError, AppResult, CacheError, ScrapeError};

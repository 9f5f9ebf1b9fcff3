//! HTTP response helpers for the query boundary
//!
//! Conditional-request negotiation: entity tags are a SHA-256 of the exact
//! bytes served, and `Last-Modified` is the cache entry's write time at
//! second precision. The live entry revalidates eagerly; day entries are
//! effectively immutable between scheduled refreshes.

use axum::Json;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Timelike, Utc};
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::cache::CacheKey;

pub const LIVE_CACHE_CONTROL: &str = "public, max-age=15, stale-while-revalidate=30";
pub const IMMUTABLE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// 503 with a retry hint; the query path never blocks on a scrape.
pub fn not_ready(key: &CacheKey) -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({
            "message": format!(
                "Listings for '{key}' are still being prepared. Try again in a minute."
            )
        })),
    )
        .into_response()
}

pub fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "message": message })),
    )
        .into_response()
}

/// Serve a JSON payload honoring the request's conditional validators.
pub fn conditional_json(
    request_headers: &HeaderMap,
    body: Vec<u8>,
    last_modified: DateTime<Utc>,
    cache_control: &'static str,
) -> Response {
    let etag = format!("\"{}\"", hex::encode(Sha256::digest(&body)));
    // HTTP dates carry whole seconds only.
    let last_modified = last_modified.with_nanosecond(0).unwrap_or(last_modified);

    if is_not_modified(request_headers, &etag, last_modified) {
        return StatusCode::NOT_MODIFIED.into_response();
    }

    (
        StatusCode::OK,
        [
            (header::ETAG, etag),
            (header::LAST_MODIFIED, http_date(last_modified)),
            (header::CACHE_CONTROL, cache_control.to_string()),
            (
                header::CONTENT_TYPE,
                "application/json; charset=utf-8".to_string(),
            ),
        ],
        body,
    )
        .into_response()
}

fn is_not_modified(headers: &HeaderMap, etag: &str, last_modified: DateTime<Utc>) -> bool {
    if let Some(candidate) = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
    {
        if candidate == etag {
            return true;
        }
    }

    if let Some(since) = headers
        .get(header::IF_MODIFIED_SINCE)
        .and_then(|v| v.to_str().ok())
    {
        if let Ok(since) = DateTime::parse_from_rfc2822(since) {
            return since.with_timezone(&Utc) >= last_modified;
        }
    }

    false
}

fn http_date(time: DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

//! HTTP request handlers
//!
//! Thin handlers: resolve the request to a cache key, read the store, and
//! negotiate freshness. Handlers never trigger scraping and never surface
//! scraper faults as 5xx beyond the 503 not-ready contract.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::cache::CacheKey;
use crate::web::AppState;
use crate::web::responses::{
    IMMUTABLE_CACHE_CONTROL, LIVE_CACHE_CONTROL, bad_request, conditional_json, not_ready,
};

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    date: Option<String>,
}

/// `GET /v1/matches?date=YYYY-MM-DD` (defaults to today)
pub async fn matches_by_date(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
    headers: HeaderMap,
) -> Response {
    let key = match query.date {
        Some(raw) => match CacheKey::parse(&raw) {
            Some(key) => key,
            None => return bad_request("Expected date=YYYY-MM-DD"),
        },
        None => CacheKey::Day(state.site_today()),
    };
    serve_entry(&state, key, &headers).await
}

pub async fn matches_today(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let key = CacheKey::Day(state.site_today());
    serve_entry(&state, key, &headers).await
}

pub async fn matches_tomorrow(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let key = CacheKey::Day(state.site_today() + chrono::Duration::days(1));
    serve_entry(&state, key, &headers).await
}

pub async fn matches_now(State(state): State<AppState>, headers: HeaderMap) -> Response {
    serve_entry(&state, CacheKey::Now, &headers).await
}

async fn serve_entry(state: &AppState, key: CacheKey, headers: &HeaderMap) -> Response {
    debug!("Serving cache key '{}'", key);

    let Some(entry) = state.cache.get(&key).await else {
        return not_ready(&key);
    };
    let Ok(body) = serde_json::to_vec(&entry.records) else {
        return not_ready(&key);
    };

    let cache_control = match key {
        CacheKey::Now => LIVE_CACHE_CONTROL,
        CacheKey::Day(_) => IMMUTABLE_CACHE_CONTROL,
    };
    conditional_json(headers, body, entry.last_modified, cache_control)
}

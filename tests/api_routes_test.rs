use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use chrono::Utc;
use tempfile::TempDir;
use tower::ServiceExt;

use matchday::cache::{CacheKey, CacheStore};
use matchday::models::{Channel, Competition, MatchRecord, SCHEDULED_STATUS, TeamSide};
use matchday::web::{AppState, app_router};

async fn test_app(dir: &TempDir) -> (Router, CacheStore) {
    let cache = CacheStore::new(dir.path().join("cache")).await.unwrap();
    let state = AppState {
        cache: cache.clone(),
        tz: "America/Sao_Paulo".parse().unwrap(),
    };
    let app = app_router(state, &dir.path().join("public"));
    (app, cache)
}

fn sample_records() -> Vec<MatchRecord> {
    vec![MatchRecord {
        competition: Competition {
            name: "Brasileirao".to_string(),
            emblem_url: Some("/public/countries/br.png".to_string()),
        },
        schedule: "16:00".to_string(),
        status: SCHEDULED_STATUS.to_string(),
        home: TeamSide {
            team_name: "Fortaleza".to_string(),
            emblem_url: None,
            score: String::new(),
        },
        away: TeamSide {
            team_name: "Internacional".to_string(),
            emblem_url: None,
            score: String::new(),
        },
        channels: vec![Channel {
            channel_name: "Premiere".to_string(),
            icon_url: Some("/public/channels/premiere.png".to_string()),
        }],
    }]
}

async fn send(app: &Router, uri: &str, headers: &[(header::HeaderName, &str)]) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    for (name, value) in headers {
        builder = builder.header(name, *value);
    }
    let request = builder.body(Body::empty()).unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let response_headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();
    (status, response_headers, body)
}

#[tokio::test]
async fn health_endpoint_responds() {
    let dir = TempDir::new().unwrap();
    let (app, _cache) = test_app(&dir).await;

    let (status, _headers, body) = send(&app, "/health", &[]).await;
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn unpopulated_key_is_service_unavailable_without_side_effects() {
    let dir = TempDir::new().unwrap();
    let (app, cache) = test_app(&dir).await;

    let (status, _headers, body) = send(&app, "/v1/matches/now", &[]).await;
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(json["message"].as_str().unwrap().contains("now"));

    // The miss must not create an entry.
    assert!(cache.get(&CacheKey::Now).await.is_none());
    let entries: Vec<_> = std::fs::read_dir(cache.dir()).unwrap().collect();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn populated_day_entry_is_served_with_validators() {
    let dir = TempDir::new().unwrap();
    let (app, cache) = test_app(&dir).await;

    let today = Utc::now()
        .with_timezone(&"America/Sao_Paulo".parse::<chrono_tz::Tz>().unwrap())
        .date_naive();
    cache
        .put(&CacheKey::Day(today), &sample_records())
        .await
        .unwrap();

    let (status, headers, body) = send(&app, "/v1/matches/today", &[]).await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers.contains_key(header::ETAG));
    assert!(headers.contains_key(header::LAST_MODIFIED));
    assert_eq!(
        headers.get(header::CACHE_CONTROL).unwrap(),
        "public, max-age=31536000, immutable"
    );

    let records: Vec<MatchRecord> = serde_json::from_slice(&body).unwrap();
    assert_eq!(records, sample_records());
}

#[tokio::test]
async fn matching_entity_tag_gets_an_empty_not_modified() {
    let dir = TempDir::new().unwrap();
    let (app, cache) = test_app(&dir).await;
    cache.put(&CacheKey::Now, &sample_records()).await.unwrap();

    let (status, headers, _body) = send(&app, "/v1/matches/now", &[]).await;
    assert_eq!(status, StatusCode::OK);
    let etag = headers.get(header::ETAG).unwrap().to_str().unwrap().to_string();

    let (status, _headers, body) =
        send(&app, "/v1/matches/now", &[(header::IF_NONE_MATCH, etag.as_str())]).await;

    assert_eq!(status, StatusCode::NOT_MODIFIED);
    assert!(body.is_empty());
}

#[tokio::test]
async fn mismatched_entity_tag_gets_the_payload_and_a_fresh_tag() {
    let dir = TempDir::new().unwrap();
    let (app, cache) = test_app(&dir).await;
    cache.put(&CacheKey::Now, &sample_records()).await.unwrap();

    let (status, headers, body) = send(
        &app,
        "/v1/matches/now",
        &[(header::IF_NONE_MATCH, "\"0000000000\"")],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(!body.is_empty());
    assert_ne!(headers.get(header::ETAG).unwrap(), "\"0000000000\"");
    assert_eq!(
        headers.get(header::CACHE_CONTROL).unwrap(),
        "public, max-age=15, stale-while-revalidate=30"
    );
}

#[tokio::test]
async fn explicit_date_parameter_selects_the_entry() {
    let dir = TempDir::new().unwrap();
    let (app, cache) = test_app(&dir).await;

    let day = chrono::NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
    cache.put(&CacheKey::Day(day), &sample_records()).await.unwrap();

    let (status, _headers, _body) = send(&app, "/v1/matches?date=2025-03-14", &[]).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _headers, _body) = send(&app, "/v1/matches?date=2025-03-15", &[]).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn malformed_date_parameter_is_rejected() {
    let dir = TempDir::new().unwrap();
    let (app, _cache) = test_app(&dir).await;

    let (status, _headers, body) = send(&app, "/v1/matches?date=14-03-2025", &[]).await;
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].as_str().unwrap().contains("YYYY-MM-DD"));
}

#[tokio::test]
async fn stale_entry_is_still_served_once_present() {
    // A failed refresh leaves the previous entry untouched; the API keeps
    // serving it rather than going unavailable.
    let dir = TempDir::new().unwrap();
    let (app, cache) = test_app(&dir).await;
    cache.put(&CacheKey::Now, &sample_records()).await.unwrap();

    let (status, _headers, _body) = send(&app, "/v1/matches/now", &[]).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _headers, _body) = send(&app, "/v1/matches/now", &[]).await;
    assert_eq!(status, StatusCode::OK);
}

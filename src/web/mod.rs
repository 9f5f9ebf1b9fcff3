//! Web layer
//!
//! Read-only HTTP interface over the cache: the match listing API, a health
//! endpoint, and static serving of localized images. Handlers delegate to
//! [`CacheStore`] and the response helpers; nothing here can start a scrape.

use std::net::SocketAddr;

use axum::{Router, routing::get};
use chrono::NaiveDate;
use chrono_tz::Tz;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;

use crate::cache::CacheStore;
use crate::config::Config;
use crate::errors::{AppError, AppResult};

pub mod handlers;
pub mod responses;

/// Shared state for request handlers
#[derive(Clone)]
pub struct AppState {
    pub cache: CacheStore,
    pub tz: Tz,
}

impl AppState {
    /// Current date in the site's timezone; logical days follow the source
    /// site, not the server clock.
    pub fn site_today(&self) -> NaiveDate {
        chrono::Utc::now().with_timezone(&self.tz).date_naive()
    }
}

/// Build the full application router.
pub fn app_router(state: AppState, image_root: &std::path::Path) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .nest("/v1", v1_routes())
        .nest_service("/public", ServeDir::new(image_root))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn v1_routes() -> Router<AppState> {
    Router::new()
        .route("/matches", get(handlers::matches_by_date))
        .route("/matches/today", get(handlers::matches_today))
        .route("/matches/tomorrow", get(handlers::matches_tomorrow))
        .route("/matches/now", get(handlers::matches_now))
}

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(config: &Config, cache: CacheStore, tz: Tz) -> AppResult<Self> {
        let state = AppState { cache, tz };
        let app = app_router(state, &config.storage.image_root);
        let addr: SocketAddr = format!("{}:{}", config.web.host, config.web.port)
            .parse()
            .map_err(|e| {
                AppError::configuration(format!(
                    "Invalid listen address {}:{}: {}",
                    config.web.host, config.web.port, e
                ))
            })?;
        Ok(Self { app, addr })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Bind and serve until the cancellation token fires.
    pub async fn serve(self, cancel: CancellationToken) -> AppResult<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        info!("Web server listening on {}", self.addr);

        axum::serve(listener, self.app)
            .with_graceful_shutdown(cancel.cancelled_owned())
            .await?;

        info!("Web server stopped");
        Ok(())
    }
}

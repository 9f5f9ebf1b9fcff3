use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use matchday::{
    assets::ImageLocalizer,
    cache::CacheStore,
    config::Config,
    render::chrome::ChromeEngine,
    scheduler::RefreshScheduler,
    scrape::ScrapeOrchestrator,
    web::WebServer,
};

#[derive(Parser)]
#[command(name = "matchday")]
#[command(version)]
#[command(about = "Sports match listing scraper with a cache-backed HTTP API")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("matchday={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting matchday v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);

    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }

    let tz = config.scrape.site_timezone()?;

    let cache = CacheStore::new(&config.storage.cache_dir).await?;
    info!("Cache store ready at {:?}", config.storage.cache_dir);

    let localizer = ImageLocalizer::new(&config.scrape, &config.storage)?;
    let engine = ChromeEngine::new(Duration::from_secs(config.scrape.nav_timeout_secs));
    let orchestrator = ScrapeOrchestrator::new(engine, localizer, &config.scrape);
    let scheduler = RefreshScheduler::new(orchestrator, cache.clone(), &config.schedule, tz)?;

    let cancel = CancellationToken::new();

    let scheduler_cancel = cancel.clone();
    tokio::spawn(async move {
        scheduler.run(scheduler_cancel).await;
    });

    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            signal_cancel.cancel();
        }
    });

    let server = WebServer::new(&config, cache, tz)?;
    if let Err(e) = server.serve(cancel.clone()).await {
        error!("Web server failed: {}", e);
        cancel.cancel();
        return Err(e.into());
    }

    Ok(())
}

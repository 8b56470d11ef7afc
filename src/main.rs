//! Application entry point for the `heatwatch` backend service.
//!
//! This binary orchestrates the full startup sequence, including:
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Opening the reading store (PostgreSQL, or in-memory when no
//!   `DATABASE_URL` is set) and creating the schema if it does not exist
//! - Seeding default threshold ranges
//! - Backfilling recent observations from the weather feed
//! - Starting the periodic simulator
//! - Mounting all API routes via the `routes` gateway (EMBP pattern)
//! - Binding the Axum HTTP server and serving requests
//!
//! # Environment Variables
//! - `DATABASE_URL` (optional) – PostgreSQL connection string
//! - `AXUM_LOG_LEVEL` (optional) – log verbosity (default: `debug`)
//! - `AXUM_SPAN_EVENTS` (optional) – span event mode for tracing
//!
//! See `config.rs` for the remaining settings.
use std::{env, sync::Arc};

use axum::Router;
use dotenvy::dotenv;
use is_terminal::IsTerminal;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use anyhow::Result;

use heatwatch::feed::BomFeed;
use heatwatch::simulator::Simulator;
use heatwatch::store::{MemoryStore, PgStore, ReadingStore, ThresholdStore};
use heatwatch::{config, routes, schema, AppContext};

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    dotenv().ok();
    init_tracing();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    let (readings, thresholds) = open_stores(&cfg).await?;
    if thresholds.seed_defaults().await? {
        tracing::info!("Installed default threshold ranges");
    }

    let feed = BomFeed::new(cfg.feed_url.clone(), cfg.feed_timeout)?;
    let ctx = AppContext::new(readings, thresholds, Arc::new(feed), cfg);

    // A feed outage must not keep the service from starting.
    match ctx.ingest.backfill().await {
        Ok(report) => tracing::info!(
            "Loaded historical feed data: {} new, {} already stored",
            report.inserted,
            report.skipped_existing
        ),
        Err(e) => tracing::error!("Error loading historical data: {}", e),
    }

    if ctx.config.simulator_enabled {
        Simulator::new(ctx.ingest.clone(), ctx.config.simulator_interval).spawn();
    } else {
        tracing::info!("Simulator disabled");
    }

    let addr = ctx.config.bind_addr;

    // Build app from routes gateway (EMBP)
    let app: Router = routes::router(ctx);

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

// ---

/// Connect to PostgreSQL when configured, otherwise fall back to memory.
async fn open_stores(
    cfg: &config::Config,
) -> Result<(Arc<dyn ReadingStore>, Arc<dyn ThresholdStore>)> {
    // ---
    let Some(db_url) = cfg.db_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set, readings are kept in memory only");
        let store = Arc::new(MemoryStore::new());
        let readings: Arc<dyn ReadingStore> = store.clone();
        let thresholds: Arc<dyn ThresholdStore> = store;
        return Ok((readings, thresholds));
    };

    tracing::info!("Attempting to connect to database");

    let pool = PgPoolOptions::new()
        .max_connections(cfg.db_pool_max)
        .connect(db_url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;

    tracing::info!("Successfully connected to database");

    schema::create_schema(&pool).await?;

    let store = Arc::new(PgStore::new(pool));
    let readings: Arc<dyn ReadingStore> = store.clone();
    let thresholds: Arc<dyn ThresholdStore> = store;
    Ok((readings, thresholds))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

/// Initialize the global tracing subscriber for structured logging.
///
/// This function configures the [`tracing_subscriber`] with:
/// - Log target, file, and line number output enabled
/// - Color output controlled by TTY detection and `FORCE_COLOR` env var:
///   - `FORCE_COLOR=1|true|yes`: force colors on
///   - `FORCE_COLOR=0|false|no`: force colors off
///   - unset or other values: auto-detect TTY
/// - Span event emission mode controlled by the `AXUM_SPAN_EVENTS` env var:
///   - `"full"`       : emit ENTER, EXIT, and CLOSE events with timing
///   - `"enter_exit"` : emit ENTER and EXIT only
///   - unset or other values: emit CLOSE events only (default)
/// - Log level controlled by `RUST_LOG`, else the `AXUM_LOG_LEVEL` env var
///
/// Call once at startup before any logging macros are invoked.
fn init_tracing() {
    // ---
    let span_events = match env::var("AXUM_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    // Determine if we should use colors
    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stdout().is_terminal(),
    };

    // Use RUST_LOG if available, otherwise fall back to AXUM_LOG_LEVEL
    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("AXUM_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("warn") => "warn",
            Some("error") => "error",
            _ => "debug",
        };
        EnvFilter::new(format!("{level},sqlx::query=warn,hyper=info,reqwest=info"))
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}

//! Application entry point for the `shrimpwatch` backend service.
//!
//! This binary orchestrates the full startup sequence for the water-quality
//! API, including:
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Establishing a PostgreSQL connection pool
//! - Creating the database schema if it does not exist
//! - Starting the background quality monitor
//! - Mounting all API routes via the `routes` gateway (EMBP pattern)
//! - Serving requests until Ctrl-C, then stopping the monitor
//!
//! # Environment Variables
//! - `DATABASE_URL` (**required**, or the `DB_*` parts) – PostgreSQL connection string
//! - `JWT_SECRET` (**required**) – token signing secret
//! - `AXUM_LOG_LEVEL` (optional) – log verbosity (default: `debug`)
//! - `AXUM_SPAN_EVENTS` (optional) – span event mode for tracing
//!
//! See `config.rs` for the remaining tunables.
use std::{env, net::SocketAddr, sync::Arc, time::Duration};

use dotenvy::dotenv;
use is_terminal::IsTerminal;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::watch;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use anyhow::Result;

mod auth;
mod config;
mod db;
mod error;
mod evaluator;
mod extract;
mod models;
mod monitor;
mod routes;
mod schema;
mod state;

pub use config::Config;

// Re-exported so sibling modules depend on the crate root rather than on
// each other's paths.
pub use models::{User, WaterReading};

use monitor::QualityMonitor;
use state::AppState;

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    dotenv().ok();
    init_tracing();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    tracing::info!("Attempting to connect to database: {}", cfg.db_target());

    let pool = PgPoolOptions::new()
        .max_connections(cfg.db_pool_max)
        .connect_with(cfg.db.clone())
        .await
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to connect to database '{}': {}",
                cfg.db_target(),
                e
            )
        })?;

    tracing::info!("Successfully connected to database");

    schema::create_schema(&pool).await?;

    let monitor = match cfg.monitor_interval_secs {
        0 => {
            tracing::info!("Quality monitor disabled");
            None
        }
        secs => Some(QualityMonitor::spawn(
            pool.clone(),
            Duration::from_secs(u64::from(secs)),
        )),
    };
    let quality = match &monitor {
        Some(m) => m.subscribe(),
        None => watch::channel(None).1,
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    let state = AppState {
        pool,
        config: Arc::new(cfg),
        quality,
    };

    // Build app from routes gateway (EMBP)
    let app = routes::router(state);

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(monitor) = monitor {
        monitor.shutdown().await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

// ---

async fn shutdown_signal() {
    // ---
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
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
/// - Log level controlled by `RUST_LOG`, falling back to `AXUM_LOG_LEVEL`
///
/// Called once at startup, after `.env` is loaded so that the variables
/// above may come from it.
fn init_tracing() {
    // ---
    let span_events = match env::var("AXUM_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

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
        EnvFilter::new(format!("{level},sqlx::query=warn"))
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

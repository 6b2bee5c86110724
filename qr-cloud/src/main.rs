//! qr-cloud: multi-tenant QR ordering backend
//!
//! Long-running service that:
//! - Serves public menus and accepts customer orders per restaurant
//! - Provides the owner dashboard API (JWT authenticated)
//! - Pushes live order events to connected dashboards over WebSocket
//! - Tracks API errors for the monitoring endpoints

mod api;
mod auth;
mod config;
mod db;
mod error;
mod live;
mod monitor;
mod services;
mod state;
mod util;
mod validation;

use std::net::SocketAddr;

use config::Config;
use state::AppState;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const HOUSEKEEPING_INTERVAL: std::time::Duration = std::time::Duration::from_secs(300);

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_log_filter()));
    if config.log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(
        environment = %config.environment,
        debug = config.debug,
        "Starting qr-cloud v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Initialize application state
    let state = AppState::new(&config).await?;
    let app = api::create_router(state.clone(), &config.allowed_origins);

    let shutdown = CancellationToken::new();

    // Periodic cleanup: stale rate-limit windows and old error metrics
    let rate_limiter = state.rate_limiter.clone();
    let monitor = state.monitor.clone();
    let housekeeping_shutdown = shutdown.clone();
    let housekeeping = tokio::spawn(async move {
        let mut interval = tokio::time::interval(HOUSEKEEPING_INTERVAL);
        loop {
            tokio::select! {
                _ = housekeeping_shutdown.cancelled() => break,
                _ = interval.tick() => {
                    rate_limiter.cleanup().await;
                    monitor.prune().await;
                }
            }
        }
    });

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("qr-cloud HTTP listening on {http_addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
    .await?;

    shutdown.cancel();
    housekeeping.await?;
    tracing::info!("qr-cloud stopped");
    Ok(())
}

/// Resolves on Ctrl+C and cancels `shutdown` for the background tasks
async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
    shutdown.cancel();
}

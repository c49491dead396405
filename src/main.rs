// =============================================================================
// ETF Pulse — Main Entry Point
// =============================================================================
//
// Serves the technical-indicator dashboard API. All work is request-driven;
// the only long-lived task is the HTTP server itself.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod indicators;
mod market_data;
mod report;
mod runtime_config;
mod signals;
mod types;
mod yahoo;

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::runtime_config::{DashboardConfig, DEFAULT_CONFIG_PATH};
use crate::yahoo::YahooClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("ETF Pulse starting up");

    let config_path =
        std::env::var("ETF_PULSE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut config = DashboardConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(path = %config_path, error = %e, "Failed to load config, using defaults");
        DashboardConfig::default()
    });
    config.apply_env(|key| std::env::var(key).ok());

    info!(
        port_env = ?std::env::var("PORT").ok(),
        zeabur_port_env = ?std::env::var("ZEABUR_PORT").ok(),
        port = config.port,
        cache_ttl_secs = config.cache_ttl_secs,
        default_selection = %config.default_selection,
        "Configuration resolved"
    );

    // ── 2. Upstream client & shared state ────────────────────────────────
    let yahoo = Arc::new(YahooClient::new(&config.yahoo)?);
    info!(base_url = %config.yahoo.base_url, "Yahoo Finance client ready");

    let bind_addr = config.bind_addr();
    let state = Arc::new(AppState::new(config, yahoo));

    // ── 3. HTTP server ───────────────────────────────────────────────────
    let app = api::rest::router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server on {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => warn!("Shutdown signal received, stopping gracefully"),
                Err(e) => {
                    warn!(error = %e, "Cannot listen for Ctrl+C, running until killed");
                    std::future::pending::<()>().await;
                }
            }
        })
        .await
        .context("API server failed")?;

    info!("ETF Pulse shut down complete.");
    Ok(())
}

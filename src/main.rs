//! schoolboard-gateway server entry point.
//!
//! Loads the configuration, opens the live dashboard feeds, and starts the
//! Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use schoolboard_gateway::api;
use schoolboard_gateway::app_state::AppState;
use schoolboard_gateway::config::{GatewayConfig, LogFormat};
use schoolboard_gateway::domain::{EventBus, MemoryStore};
use schoolboard_gateway::pipeline::SystemClock;
use schoolboard_gateway::service::{DashboardService, ViewSettings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = GatewayConfig::from_env().context("invalid LISTEN_ADDR")?;
    init_tracing(config.log_format);
    tracing::info!(addr = %config.listen_addr, "starting schoolboard-gateway");

    let store = Arc::new(MemoryStore::new());
    if let Some(path) = &config.seed_file {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading seed file {}", path.display()))?;
        let seed: serde_json::Value = serde_json::from_str(&raw)
            .with_context(|| format!("parsing seed file {}", path.display()))?;
        let loaded = store
            .load_seed(&seed)
            .with_context(|| format!("loading seed file {}", path.display()))?;
        tracing::info!(documents = loaded, path = %path.display(), "seed data loaded");
    }

    let event_bus = EventBus::new(config.event_bus_capacity);
    let dashboard = Arc::new(DashboardService::new(
        store,
        event_bus,
        Arc::new(SystemClock),
        ViewSettings::from(&config),
    ));
    let feeds = dashboard.start()?;

    let app = api::build_app(AppState::new(dashboard));

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    feeds.shutdown().await;
    tracing::info!("server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}

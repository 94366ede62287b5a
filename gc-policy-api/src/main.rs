//! GC Policy - Main Application Entry Point
//!
//! Serves policy building and change detection for column family GC
//! configurations, backed by an in-memory table admin.

use anyhow::Context;
use gc_policy_api::{AppState, ServerConfig};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting GC policy server on {}", config.bind_address());

    let app_state = Arc::new(
        AppState::seeded(&config.tables).context("failed to seed in-memory tables")?,
    );

    let app = gc_policy_api::create_router(app_state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

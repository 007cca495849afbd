//! Quire Server: application entry point.

use anyhow::Context;
use quire_db::TenantResolver;
use quire_server::{AppState, ServerConfig, build_router};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("quire=info,tower_http=info")),
        )
        .json()
        .init();

    let config = ServerConfig::load().context("invalid configuration")?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        tenancy = %config.tenancy,
        database_url = %config.database.url,
        "Starting Quire server..."
    );

    let resolver = TenantResolver::connect(
        config.tenancy,
        config.database.clone(),
        config.provisioning(),
    )
    .await
    .context("failed to connect to the database")?;

    let state = AppState::new(resolver, config.auth.clone())
        .with_cors_origins(config.cors_origins.clone());
    let app = build_router(state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %config.bind_addr, "Listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Quire server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}

mod api_client;
mod config;
mod models;
mod routes;
mod services;
mod state;
#[cfg(test)]
mod test_support;

use anyhow::Context;
use api_client::{ApiClient, REQUEST_TIMEOUT};
use clap::{error::ErrorKind, CommandFactory, Parser};
use config::{Args, Config};
use state::AppState;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("crypto_price_exporter=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match Config::from_args(Args::parse()) {
        Ok(config) => config,
        // Prints the error with usage and exits non-zero
        Err(e) => Args::command().error(ErrorKind::ValueValidation, e).exit(),
    };

    let state = AppState::new(&config.assets);
    let api_client = ApiClient::new(config.api_url.clone(), REQUEST_TIMEOUT)?;
    let shutdown = CancellationToken::new();

    // Spawn price polling task
    let polling = tokio::spawn(services::price_service::start_price_polling(
        state.clone(),
        api_client,
        config.assets.clone(),
        config.refresh_interval,
        shutdown.clone(),
    ));

    tokio::spawn(shutdown_signal(shutdown.clone()));

    let listener = tokio::net::TcpListener::bind(&config.listen_address)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_address))?;
    tracing::info!("Prometheus exporter listening on {}", listener.local_addr()?);

    let result = axum::serve(listener, routes::router(state))
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .await
        .context("HTTP server failed");

    // Also stops the poller when the server exits on its own
    shutdown.cancel();
    polling.await.context("price polling task panicked")?;
    tracing::info!("Shutdown complete");

    result
}

async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, stopping refresh"),
        _ = terminate => tracing::info!("Received SIGTERM, stopping refresh"),
    }

    shutdown.cancel();
}

//! Strictly Relay - unified CLI
//!
//! Runs the WebSocket session relay.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use std::sync::Arc;
use strictly_relay::{AppState, RelayConfig, WsTransport, serve, spawn_coordinator};
use tracing::{info, instrument, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            config,
            host,
            port,
            log_filter,
        } => {
            let config =
                RelayConfig::load(config.as_deref())?.with_overrides(host, port, log_filter);
            initialize_tracing(config.log_filter());
            run_server(config).await
        }
        Command::Config { config } => {
            let config = RelayConfig::load(config.as_deref())?;
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

/// Run the relay until Ctrl+C.
#[instrument(skip_all, fields(address = %config.bind_address()))]
async fn run_server(config: RelayConfig) -> Result<()> {
    info!("Starting Strictly Relay");

    let transport = Arc::new(WsTransport::new());
    let coordinator = spawn_coordinator(transport.clone());
    let state = AppState::new(coordinator.clone(), transport);

    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address()))?;

    serve(listener, state, shutdown_signal()).await?;

    match coordinator.shutdown().await {
        Ok(store) => info!(sessions = store.len(), "Relay stopped, sessions discarded"),
        Err(err) => warn!(error = %err, "Coordinator was already stopped"),
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

fn initialize_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

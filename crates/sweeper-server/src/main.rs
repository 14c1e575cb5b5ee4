//! Sweeper backend binary.
//!
//! Wires together the spectator simulation, the accounts and leaderboard
//! store, and the HTTP API, then serves until asked to stop.
//!
//! # Startup Sequence
//!
//! 1. Load configuration (`SWEEPER_CONFIG`, else `sweeper-config.yaml`)
//! 2. Initialize structured logging (tracing)
//! 3. Bind the listening socket
//! 4. Open the store (`PostgreSQL` when `DATABASE_URL` is set, memory otherwise)
//! 5. Build the simulation engine and start its clock loop
//! 6. Serve HTTP until Ctrl-C or SIGTERM; open spectator streams are closed
//! 7. Stop the clock loop and close the store

mod error;

use std::path::PathBuf;
use std::sync::Arc;

use sweeper_api::AppState;
use sweeper_core::{SimulationEngine, SweeperConfig};
use sweeper_db::Store;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::ServerError;

/// Config file read when `SWEEPER_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "sweeper-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, the store, or the HTTP listener
/// cannot be set up.
#[tokio::main]
async fn main() -> Result<(), ServerError> {
    // Config first: it carries the default log level.
    let (config, config_source) = load_config()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!(
        config = %config_source,
        host = %config.server.host,
        port = config.server.port,
        tick_interval_ms = config.simulation.tick_interval_ms,
        publish_interval_ms = config.simulation.publish_interval_ms,
        seed = ?config.simulation.seed,
        "sweeper-server starting"
    );

    let listener = sweeper_api::bind(&config.server).await?;
    let store = Store::open(config.infrastructure.database_url.as_deref()).await?;

    let engine = Arc::new(SimulationEngine::from_settings(&config.simulation));
    engine.ensure_running().await;

    let state = Arc::new(AppState::new(Arc::clone(&engine), store.clone()));
    let served = sweeper_api::serve(listener, state, shutdown_signal()).await;

    engine.shutdown().await;
    store.close().await;
    info!(ticks = engine.ticks(), "sweeper-server shutdown complete");

    served.map_err(ServerError::from)
}

/// Load configuration, falling back to defaults when no file exists.
///
/// Returns the config and a description of where it came from.
fn load_config() -> Result<(SweeperConfig, String), ServerError> {
    let path = std::env::var_os("SWEEPER_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);

    if path.exists() {
        let config = SweeperConfig::from_file(&path)?;
        Ok((config, path.display().to_string()))
    } else {
        Ok((SweeperConfig::parse("")?, String::from("defaults")))
    }
}

/// Resolve on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Ctrl-C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Ctrl-C received, shutting down"),
        () = terminate => info!("SIGTERM received, shutting down"),
    }
}

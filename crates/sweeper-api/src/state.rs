//! Shared application state for the HTTP API.

use std::sync::Arc;

use sweeper_core::SimulationEngine;
use sweeper_db::Store;
use tokio_util::sync::CancellationToken;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor. Built
/// once at the composition root; handlers only borrow from it.
#[derive(Debug)]
pub struct AppState {
    /// Spectator simulation.
    pub engine: Arc<SimulationEngine>,
    /// Accounts and leaderboard.
    pub store: Store,
    /// Cancelled when the server begins shutting down. Every open
    /// spectator stream ends when this fires.
    pub closing: CancellationToken,
}

impl AppState {
    /// Bundle the engine and store.
    pub fn new(engine: Arc<SimulationEngine>, store: Store) -> Self {
        Self {
            engine,
            store,
            closing: CancellationToken::new(),
        }
    }
}

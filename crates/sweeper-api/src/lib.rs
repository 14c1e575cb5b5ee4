//! HTTP API for the Sweeper backend.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Account endpoints** (`/auth/*`, `/users`) for signup, login, and
//!   identity lookup via the `x-user-id` header
//! - **Leaderboard endpoints** (`/leaderboard`) for reading and
//!   submitting scores
//! - **Spectator endpoints** (`/spectator/*`) for watching simulated
//!   games, including a server-sent events stream
//!
//! # Architecture
//!
//! Handlers share one [`AppState`] holding the [`SimulationEngine`] and
//! the [`Store`]. Spectator reads are lock-free loads of the engine's
//! current snapshot, so watching never blocks the tick loop. [`serve`]
//! closes every open spectator stream when shutdown begins.
//!
//! [`SimulationEngine`]: sweeper_core::SimulationEngine
//! [`Store`]: sweeper_db::Store

pub mod error;
pub mod extract;
pub mod handlers;
pub mod router;
pub mod server;
pub mod spectator;
pub mod state;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerError, bind, serve};
pub use state::AppState;

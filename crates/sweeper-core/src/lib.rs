//! Spectator simulation engine for the Sweeper backend.
//!
//! Spectators watch a fixed roster of simulated Minesweeper games. This
//! crate owns those games: it generates boards, advances every session on
//! a background clock loop, and serves snapshots and snapshot streams to
//! the HTTP layer.
//!
//! # Modules
//!
//! - [`board`] -- Mid-game board generator.
//! - [`clock`] -- [`Clock`] seam for timestamps ([`SystemClock`], [`ManualClock`]).
//! - [`config`] -- Configuration loading from `sweeper-config.yaml`.
//! - [`engine`] -- [`SimulationEngine`]: roster ownership, ticks, loop lifecycle.
//! - [`entropy`] -- [`Entropy`] seam for randomness.
//! - [`publisher`] -- Per-subscriber snapshot streams.
//! - [`registry`] -- Copy-on-write session registry.
//! - [`session`] -- Per-session state machine.
//!
//! [`Clock`]: clock::Clock
//! [`SystemClock`]: clock::SystemClock
//! [`ManualClock`]: clock::ManualClock
//! [`SimulationEngine`]: engine::SimulationEngine
//! [`Entropy`]: entropy::Entropy

pub mod board;
pub mod clock;
pub mod config;
pub mod engine;
pub mod entropy;
pub mod publisher;
pub mod registry;
pub mod session;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, SweeperConfig};
pub use engine::{SimulationEngine, TickReport};
pub use entropy::{Entropy, FixedEntropy, SeededEntropy};
pub use publisher::SnapshotStream;
pub use registry::{Registry, Snapshot};

//! Shared type definitions for the Sweeper spectator backend.
//!
//! Every crate in the workspace speaks in these types: the simulation core
//! produces [`ActivePlayer`] snapshots, the data layer stores [`User`] and
//! [`LeaderboardEntry`] records, and the API serializes all of them.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for entity identifiers
//! - [`enums`] -- Game status and difficulty
//! - [`structs`] -- Boards, sessions, accounts, leaderboard entries

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Difficulty, GameStatus, ParseDifficultyError};
pub use ids::{EntryId, SessionId, UserId};
pub use structs::{ActivePlayer, AuthResponse, Board, BoardShapeError, Cell, LeaderboardEntry, User};

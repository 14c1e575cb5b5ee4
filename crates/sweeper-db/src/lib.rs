//! Accounts and leaderboard persistence for the Sweeper backend.
//!
//! Two interchangeable backends sit behind [`Store`]:
//!
//! ```text
//! Store
//!   |-- Memory    (MemoryStore: seeded demo data, lost on exit)
//!   +-- Postgres  (PostgresPool: embedded migrations)
//!         |-- AccountStore      (users)
//!         +-- LeaderboardStore  (leaderboard_entries)
//! ```
//!
//! Passwords are stored only as argon2 digests, see [`password`].
//!
//! # Modules
//!
//! - [`store`] -- Backend selection and dispatch
//! - [`memory`] -- In-process seeded store
//! - [`postgres`] -- `PostgreSQL` connection pool and migrations
//! - [`account_store`] -- `users` table operations
//! - [`leaderboard_store`] -- `leaderboard_entries` table operations
//! - [`password`] -- Argon2 hashing and verification
//! - [`models`] -- Input records
//! - [`error`] -- Shared error types

pub mod account_store;
pub mod error;
pub mod leaderboard_store;
pub mod memory;
pub mod models;
pub mod password;
pub mod postgres;
pub mod store;

// Re-export primary types for convenience.
pub use account_store::{AccountStore, UserRow};
pub use error::{AccountError, DbError};
pub use leaderboard_store::{LeaderboardStore, ScoreRow};
pub use memory::MemoryStore;
pub use models::{NewAccount, NewScore};
pub use postgres::{PostgresConfig, PostgresPool};
pub use store::Store;

//! Backend selection for accounts and the leaderboard.
//!
//! The API holds one [`Store`] and never cares which backend sits behind
//! it. [`Store::open`] picks `PostgreSQL` when a URL is configured and the
//! seeded in-memory store otherwise.

use sweeper_types::{LeaderboardEntry, User, UserId};

use crate::account_store::AccountStore;
use crate::error::{AccountError, DbError};
use crate::leaderboard_store::LeaderboardStore;
use crate::memory::MemoryStore;
use crate::models::{NewAccount, NewScore};
use crate::postgres::{PostgresConfig, PostgresPool};

/// Accounts and leaderboard persistence. Cheap to clone.
#[derive(Debug, Clone)]
pub enum Store {
    /// Volatile process-local tables.
    Memory(MemoryStore),
    /// Durable `PostgreSQL` tables.
    Postgres(PostgresPool),
}

impl Store {
    /// Open the backend for `database_url`, or the seeded memory store when
    /// there is none.
    pub async fn open(database_url: Option<&str>) -> Result<Self, DbError> {
        let store = match database_url {
            Some(url) => Self::Postgres(PostgresPool::connect(&PostgresConfig::new(url)).await?),
            None => Self::Memory(MemoryStore::seeded().await?),
        };
        tracing::info!(backend = store.backend_name(), "Store ready");
        Ok(store)
    }

    /// Short name of the active backend, for logs.
    pub const fn backend_name(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Postgres(_) => "postgres",
        }
    }

    /// Register a new account.
    pub async fn signup(&self, account: NewAccount<'_>) -> Result<User, AccountError> {
        match self {
            Self::Memory(mem) => mem.signup(account).await,
            Self::Postgres(pg) => AccountStore::new(pg.pool()).signup(account).await,
        }
    }

    /// Authenticate by email and password.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AccountError> {
        match self {
            Self::Memory(mem) => mem.login(email, password).await,
            Self::Postgres(pg) => AccountStore::new(pg.pool()).login(email, password).await,
        }
    }

    /// Look up an account by id.
    pub async fn find_user(&self, id: UserId) -> Result<Option<User>, DbError> {
        match self {
            Self::Memory(mem) => Ok(mem.find_user(id).await),
            Self::Postgres(pg) => AccountStore::new(pg.pool()).find(id).await,
        }
    }

    /// All accounts, newest first.
    pub async fn list_users(&self) -> Result<Vec<User>, DbError> {
        match self {
            Self::Memory(mem) => Ok(mem.list_users().await),
            Self::Postgres(pg) => AccountStore::new(pg.pool()).list().await,
        }
    }

    /// The `limit` fastest leaderboard entries, fastest first.
    pub async fn top_scores(&self, limit: u32) -> Result<Vec<LeaderboardEntry>, DbError> {
        match self {
            Self::Memory(mem) => Ok(mem.top_scores(limit).await),
            Self::Postgres(pg) => LeaderboardStore::new(pg.pool()).top(limit).await,
        }
    }

    /// Record a new score.
    pub async fn submit_score(&self, score: NewScore<'_>) -> Result<LeaderboardEntry, DbError> {
        match self {
            Self::Memory(mem) => Ok(mem.submit_score(score).await),
            Self::Postgres(pg) => LeaderboardStore::new(pg.pool()).submit(score).await,
        }
    }

    /// Release backend resources.
    pub async fn close(&self) {
        if let Self::Postgres(pg) = self {
            pg.close().await;
        }
    }
}

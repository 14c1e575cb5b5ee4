//! In-process account and leaderboard store.
//!
//! Used when no database is configured. State lives behind a single
//! [`RwLock`] and disappears with the process. [`MemoryStore::seeded`]
//! preloads the two demo accounts and eight sample scores the frontend
//! expects during local development.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use sweeper_types::{Difficulty, EntryId, LeaderboardEntry, User, UserId};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AccountError, DbError};
use crate::models::{NewAccount, NewScore};
use crate::password;

/// Demo accounts: `(id, username, email)`. Both use the password `pass`.
const DEMO_USERS: [(u128, &str, &str); 2] = [
    (
        0x1111_1111_1111_1111_1111_1111_1111_1111,
        "alice",
        "alice@example.com",
    ),
    (
        0x2222_2222_2222_2222_2222_2222_2222_2222,
        "bob",
        "bob@example.com",
    ),
];

/// Password shared by the demo accounts.
const DEMO_PASSWORD: &str = "pass";

/// Sample scores: `(username, seconds, day of January 2024)`.
const DEMO_SCORES: [(&str, u32, u32); 8] = [
    ("SpeedRunner", 42, 15),
    ("MineExpert", 56, 14),
    ("BombDefuser", 63, 13),
    ("QuickClick", 71, 12),
    ("SafePlayer", 89, 11),
    ("FlagMaster", 94, 10),
    ("CoolGamer", 105, 9),
    ("ProSweeper", 112, 8),
];

#[derive(Debug, Clone)]
struct Account {
    user: User,
    digest: String,
}

#[derive(Debug, Default)]
struct Tables {
    accounts: Vec<Account>,
    scores: Vec<LeaderboardEntry>,
}

/// Volatile store. Cloning shares the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with the demo accounts and sample scores.
    pub async fn seeded() -> Result<Self, DbError> {
        let digest = password::hash_password(DEMO_PASSWORD).await?;
        let now = Utc::now();

        let accounts = DEMO_USERS
            .iter()
            .map(|&(id, username, email)| Account {
                user: User {
                    id: UserId::from(Uuid::from_u128(id)),
                    username: username.to_owned(),
                    email: email.to_owned(),
                    created_at: now,
                },
                digest: digest.clone(),
            })
            .collect();

        let scores = DEMO_SCORES
            .iter()
            .zip(1_u128..)
            .map(|(&(username, time, day), n)| {
                Ok(LeaderboardEntry {
                    id: EntryId::from(Uuid::from_u128(n)),
                    username: username.to_owned(),
                    time,
                    date: january_2024(day)?,
                    difficulty: Difficulty::Easy,
                })
            })
            .collect::<Result<Vec<_>, DbError>>()?;

        tracing::debug!(users = DEMO_USERS.len(), scores = DEMO_SCORES.len(), "Seeded memory store");
        Ok(Self {
            tables: Arc::new(RwLock::new(Tables { accounts, scores })),
        })
    }

    /// Register a new account.
    pub async fn signup(&self, account: NewAccount<'_>) -> Result<User, AccountError> {
        // Digest outside the lock; argon2 takes tens of milliseconds.
        let digest = password::hash_password(account.password).await?;

        let mut tables = self.tables.write().await;
        if tables.accounts.iter().any(|a| a.user.email == account.email) {
            return Err(AccountError::EmailTaken);
        }
        if tables
            .accounts
            .iter()
            .any(|a| a.user.username == account.username)
        {
            return Err(AccountError::UsernameTaken);
        }

        let user = User {
            id: UserId::new(),
            username: account.username.to_owned(),
            email: account.email.to_owned(),
            created_at: Utc::now(),
        };
        tables.accounts.push(Account {
            user: user.clone(),
            digest,
        });
        Ok(user)
    }

    /// Authenticate by email and password.
    pub async fn login(&self, email: &str, plain: &str) -> Result<User, AccountError> {
        let account = {
            let tables = self.tables.read().await;
            tables
                .accounts
                .iter()
                .find(|a| a.user.email == email)
                .cloned()
                .ok_or(AccountError::UnknownEmail)?
        };

        if password::verify_password(plain, &account.digest).await? {
            Ok(account.user)
        } else {
            Err(AccountError::WrongPassword)
        }
    }

    /// Look up an account by id.
    pub async fn find_user(&self, id: UserId) -> Option<User> {
        self.tables
            .read()
            .await
            .accounts
            .iter()
            .find(|a| a.user.id == id)
            .map(|a| a.user.clone())
    }

    /// All accounts, newest first.
    pub async fn list_users(&self) -> Vec<User> {
        let mut users: Vec<User> = self
            .tables
            .read()
            .await
            .accounts
            .iter()
            .map(|a| a.user.clone())
            .collect();
        // Registration order breaks ties, newest first.
        users.reverse();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        users
    }

    /// The `limit` fastest entries, fastest first. Equal times keep
    /// insertion order.
    pub async fn top_scores(&self, limit: u32) -> Vec<LeaderboardEntry> {
        let mut scores = self.tables.read().await.scores.clone();
        scores.sort_by_key(|entry| entry.time);
        scores.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        scores
    }

    /// Record a new score stamped with the current time.
    pub async fn submit_score(&self, score: NewScore<'_>) -> LeaderboardEntry {
        let entry = LeaderboardEntry {
            id: EntryId::new(),
            username: score.username.to_owned(),
            time: score.time,
            date: Utc::now(),
            difficulty: score.difficulty,
        };
        self.tables.write().await.scores.push(entry.clone());
        entry
    }
}

fn january_2024(day: u32) -> Result<DateTime<Utc>, DbError> {
    Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0)
        .single()
        .ok_or_else(|| DbError::Config(format!("invalid seed date 2024-01-{day}")))
}

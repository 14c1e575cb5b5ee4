//! Account persistence in `PostgreSQL`.
//!
//! Operates on the `users` table. Email and username uniqueness are
//! checked up front so the caller gets the specific rejection; the table's
//! unique constraints catch the race where two signups collide.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sweeper_types::{User, UserId};
use uuid::Uuid;

use crate::error::{AccountError, DbError};
use crate::models::NewAccount;
use crate::password;

/// Row from the `users` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    /// Account identifier.
    pub id: Uuid,
    /// Unique display name.
    pub username: String,
    /// Unique login email.
    pub email: String,
    /// Argon2 PHC digest.
    pub password_hash: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::from(row.id),
            username: row.username,
            email: row.email,
            created_at: row.created_at,
        }
    }
}

/// Operations on the `users` table.
pub struct AccountStore<'a> {
    pool: &'a PgPool,
}

impl<'a> AccountStore<'a> {
    /// Create a store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Register a new account.
    pub async fn signup(&self, account: NewAccount<'_>) -> Result<User, AccountError> {
        if self.exists("email", account.email).await? {
            return Err(AccountError::EmailTaken);
        }
        if self.exists("username", account.username).await? {
            return Err(AccountError::UsernameTaken);
        }

        let digest = password::hash_password(account.password).await?;
        let id = UserId::new();

        let row = sqlx::query_as::<_, UserRow>(
            r"INSERT INTO users (id, username, email, password_hash, created_at)
              VALUES ($1, $2, $3, $4, now())
              RETURNING id, username, email, password_hash, created_at",
        )
        .bind(id.into_inner())
        .bind(account.username)
        .bind(account.email)
        .bind(&digest)
        .fetch_one(self.pool)
        .await
        .map_err(map_unique_violation)?;

        tracing::debug!(user_id = %id, "Inserted user");
        Ok(row.into())
    }

    /// Authenticate by email and password.
    pub async fn login(&self, email: &str, plain: &str) -> Result<User, AccountError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"SELECT id, username, email, password_hash, created_at
              FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await
        .map_err(DbError::from)?
        .ok_or(AccountError::UnknownEmail)?;

        if password::verify_password(plain, &row.password_hash).await? {
            Ok(row.into())
        } else {
            Err(AccountError::WrongPassword)
        }
    }

    /// Look up an account by id.
    pub async fn find(&self, id: UserId) -> Result<Option<User>, DbError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"SELECT id, username, email, password_hash, created_at
              FROM users WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    /// All accounts, newest first.
    pub async fn list(&self) -> Result<Vec<User>, DbError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r"SELECT id, username, email, password_hash, created_at
              FROM users ORDER BY created_at DESC",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn exists(&self, column: &'static str, value: &str) -> Result<bool, DbError> {
        // `column` is one of two literals above, never user input.
        let sql = format!("SELECT EXISTS (SELECT 1 FROM users WHERE {column} = $1)");
        let found: bool = sqlx::query_scalar(&sql)
            .bind(value)
            .fetch_one(self.pool)
            .await?;
        Ok(found)
    }
}

/// Turn a unique-constraint race into the matching rejection.
fn map_unique_violation(err: sqlx::Error) -> AccountError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return if db.constraint().is_some_and(|c| c.contains("email")) {
                AccountError::EmailTaken
            } else {
                AccountError::UsernameTaken
            };
        }
    }
    AccountError::Db(DbError::Postgres(err))
}

//! Leaderboard persistence in `PostgreSQL`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sweeper_types::{Difficulty, EntryId, LeaderboardEntry};
use uuid::Uuid;

use crate::error::DbError;
use crate::models::NewScore;

/// Row from the `leaderboard_entries` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScoreRow {
    /// Entry identifier.
    pub id: Uuid,
    /// Name the score was submitted under.
    pub username: String,
    /// Completion time in seconds.
    pub time_seconds: i32,
    /// When the score was recorded.
    pub date: DateTime<Utc>,
    /// `easy`, `medium`, or `hard`.
    pub difficulty: String,
}

impl TryFrom<ScoreRow> for LeaderboardEntry {
    type Error = DbError;

    fn try_from(row: ScoreRow) -> Result<Self, Self::Error> {
        let time = u32::try_from(row.time_seconds).map_err(|_err| {
            DbError::CorruptRow(format!("negative time {} on entry {}", row.time_seconds, row.id))
        })?;
        let difficulty = row
            .difficulty
            .parse::<Difficulty>()
            .map_err(|e| DbError::CorruptRow(format!("{e} on entry {}", row.id)))?;
        Ok(Self {
            id: EntryId::from(row.id),
            username: row.username,
            time,
            date: row.date,
            difficulty,
        })
    }
}

/// Operations on the `leaderboard_entries` table.
pub struct LeaderboardStore<'a> {
    pool: &'a PgPool,
}

impl<'a> LeaderboardStore<'a> {
    /// Create a store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The `limit` fastest entries, fastest first.
    pub async fn top(&self, limit: u32) -> Result<Vec<LeaderboardEntry>, DbError> {
        let rows = sqlx::query_as::<_, ScoreRow>(
            r"SELECT id, username, time_seconds, date, difficulty
              FROM leaderboard_entries
              ORDER BY time_seconds ASC, date ASC
              LIMIT $1",
        )
        .bind(i64::from(limit))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(LeaderboardEntry::try_from).collect()
    }

    /// Record a new score stamped with the current time.
    pub async fn submit(&self, score: NewScore<'_>) -> Result<LeaderboardEntry, DbError> {
        let time_seconds = i32::try_from(score.time)
            .map_err(|_err| DbError::OutOfRange(format!("time {} seconds", score.time)))?;
        let id = EntryId::new();

        let row = sqlx::query_as::<_, ScoreRow>(
            r"INSERT INTO leaderboard_entries (id, username, time_seconds, date, difficulty)
              VALUES ($1, $2, $3, now(), $4)
              RETURNING id, username, time_seconds, date, difficulty",
        )
        .bind(id.into_inner())
        .bind(score.username)
        .bind(time_seconds)
        .bind(score.difficulty.as_str())
        .fetch_one(self.pool)
        .await?;

        tracing::debug!(entry_id = %id, time = score.time, "Inserted leaderboard entry");
        row.try_into()
    }
}

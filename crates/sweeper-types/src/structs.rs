//! Core entity structs shared between the simulation, data layer, and API.
//!
//! Field names serialize in camelCase because the browser client consumes
//! these shapes directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::enums::{Difficulty, GameStatus};
use crate::ids::{EntryId, SessionId, UserId};

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// One square of a Minesweeper board.
///
/// `neighbor_mines` only carries meaning while the cell is revealed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    /// Whether the cell hides a mine.
    pub is_mine: bool,
    /// Whether the cell has been uncovered.
    pub is_revealed: bool,
    /// Whether the player placed a flag on the cell.
    pub is_flagged: bool,
    /// Number of adjacent mines (0..=8).
    pub neighbor_mines: u8,
}

/// A board row had a different length than the first row.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("ragged board: row {row} has {found} cells, expected {expected}")]
pub struct BoardShapeError {
    /// Index of the offending row.
    pub row: usize,
    /// Length of the offending row.
    pub found: usize,
    /// Length of the first row.
    pub expected: usize,
}

/// Dense, row-major grid of [`Cell`]s.
///
/// Every row has the same length. Serializes as a plain nested array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "Vec<Vec<Cell>>")]
pub struct Board {
    grid: Vec<Vec<Cell>>,
}

impl Board {
    /// Build a board from rows, rejecting ragged input.
    pub fn from_rows(grid: Vec<Vec<Cell>>) -> Result<Self, BoardShapeError> {
        let expected = grid.first().map_or(0, Vec::len);
        if let Some((row, found)) = grid
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|&(_, len)| len != expected)
        {
            return Err(BoardShapeError {
                row,
                found,
                expected,
            });
        }
        Ok(Self { grid })
    }

    /// Build a `rows` x `cols` board by calling `f(row, col)` for each cell.
    ///
    /// Cells are produced in row-major order, so a stateful `f` (such as one
    /// drawing from a random stream) sees a stable sequence.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> Cell) -> Self {
        let grid = (0..rows)
            .map(|row| (0..cols).map(|col| f(row, col)).collect())
            .collect();
        Self { grid }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.grid.len()
    }

    /// Number of columns (0 for an empty board).
    pub fn cols(&self) -> usize {
        self.grid.first().map_or(0, Vec::len)
    }

    /// Cell at `(row, col)`, or `None` when out of bounds.
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.grid.get(row).and_then(|r| r.get(col))
    }

    /// Iterate over every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.grid.iter().flatten()
    }
}

impl TryFrom<Vec<Vec<Cell>>> for Board {
    type Error = BoardShapeError;

    fn try_from(grid: Vec<Vec<Cell>>) -> Result<Self, Self::Error> {
        Self::from_rows(grid)
    }
}

impl Serialize for Board {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.grid.serialize(serializer)
    }
}

// ---------------------------------------------------------------------------
// Spectator session
// ---------------------------------------------------------------------------

/// One simulated game in progress, as shown to spectators.
///
/// `id` and `username` never change. `board`, `timer`, `flags_count`, and
/// `started_at` are reset together whenever a finished game restarts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivePlayer {
    /// Session identifier.
    pub id: SessionId,
    /// Display name of the simulated player.
    pub username: String,
    /// Current board state.
    pub board: Board,
    /// Current game status.
    pub status: GameStatus,
    /// Seconds elapsed in the current game.
    pub timer: u32,
    /// Flags the player has placed (simulated).
    pub flags_count: u32,
    /// Total mines on the board.
    pub mines_count: u32,
    /// When the current game attempt began.
    pub started_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Accounts and leaderboard
// ---------------------------------------------------------------------------

/// Public view of a registered account. Never carries credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Account identifier.
    pub id: UserId,
    /// Unique display name.
    pub username: String,
    /// Unique login email.
    pub email: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// A completed game recorded on the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Entry identifier.
    pub id: EntryId,
    /// Name the score was submitted under.
    pub username: String,
    /// Completion time in seconds.
    pub time: u32,
    /// When the score was recorded.
    pub date: DateTime<Utc>,
    /// Board difficulty.
    pub difficulty: Difficulty,
}

/// Outcome of a signup or login attempt.
///
/// Rejections are reported in-band (`success == false` plus `error`)
/// rather than as HTTP failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Whether the attempt succeeded.
    pub success: bool,
    /// The authenticated user, on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    /// Human-readable rejection reason, on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuthResponse {
    /// Successful attempt for `user`.
    pub const fn accepted(user: User) -> Self {
        Self {
            success: true,
            user: Some(user),
            error: None,
        }
    }

    /// Rejected attempt with a reason.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            user: None,
            error: Some(reason.into()),
        }
    }
}

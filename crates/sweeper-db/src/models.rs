//! Input records for the stores.

use sweeper_types::Difficulty;

/// Signup details. `password` is plaintext here and is digested before
/// anything is stored.
#[derive(Debug, Clone, Copy)]
pub struct NewAccount<'a> {
    /// Requested display name.
    pub username: &'a str,
    /// Login email.
    pub email: &'a str,
    /// Plaintext password.
    pub password: &'a str,
}

/// A score to record on the leaderboard.
#[derive(Debug, Clone, Copy)]
pub struct NewScore<'a> {
    /// Name to show next to the score.
    pub username: &'a str,
    /// Completion time in seconds.
    pub time: u32,
    /// Board difficulty.
    pub difficulty: Difficulty,
}

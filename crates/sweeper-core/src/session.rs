//! Per-session state machine for simulated spectator games.
//!
//! ```text
//!            roll > 0.98                 roll > 0.9
//!  playing ───────────────> lost ─────────────────────┐
//!     │  \   else roll > 0.995                         │ new board,
//!     │   ───────────────> won  ──────────────────────┤ timer = 0,
//!     │                                                │ flags = 0,
//!     └─ otherwise: timer += 1   <─────────────────────┘ startedAt = now
//! ```
//!
//! The loss check always runs first and the win roll is only drawn when the
//! loss did not fire, so both can never apply in one tick. Finished games
//! are not terminal: each tick they have a chance to restart.

use chrono::{DateTime, Duration, Utc};
use sweeper_types::{ActivePlayer, GameStatus, SessionId};

use crate::board;
use crate::entropy::Entropy;

/// A playing session is lost when its loss roll exceeds this.
pub const LOSS_THRESHOLD: f64 = 0.98;

/// A playing session that did not lose is won when its win roll exceeds this.
pub const WIN_THRESHOLD: f64 = 0.995;

/// A finished session restarts when its roll exceeds this.
pub const RESTART_THRESHOLD: f64 = 0.9;

/// Bounds of the randomized timer for a freshly spawned session.
const INITIAL_TIMER_SECS: (u32, u32) = (10, 70);

/// Bounds of the randomized flag count for a freshly spawned session.
const INITIAL_FLAGS: (u32, u32) = (0, 5);

/// Bounds of the random backdating applied to `started_at` at spawn.
const BACKDATE_SECS: (u32, u32) = (0, 120);

/// Board dimensions and mine count shared by every session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionParams {
    /// Board rows.
    pub rows: usize,
    /// Board columns.
    pub cols: usize,
    /// Mines reported per session.
    pub mines: u32,
}

impl Default for SessionParams {
    fn default() -> Self {
        Self {
            rows: 9,
            cols: 9,
            mines: 10,
        }
    }
}

/// What happened to one session during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Still playing; the timer advanced by one second.
    Continued,
    /// Went from playing to lost.
    Lost,
    /// Went from playing to won.
    Won,
    /// A finished game started over with a fresh board.
    Restarted,
    /// A finished game stayed finished.
    Idle,
}

/// Create a session that appears to be mid-game already.
///
/// The timer, flag count, and start time are randomized so a freshly booted
/// process does not show four games all sitting at zero.
pub fn spawn(
    username: &str,
    params: SessionParams,
    entropy: &mut dyn Entropy,
    now: DateTime<Utc>,
) -> ActivePlayer {
    let board = board::generate(params.rows, params.cols, entropy);
    let timer = entropy.pick(INITIAL_TIMER_SECS.0, INITIAL_TIMER_SECS.1);
    let flags_count = entropy.pick(INITIAL_FLAGS.0, INITIAL_FLAGS.1);
    let backdate = entropy.pick(BACKDATE_SECS.0, BACKDATE_SECS.1);

    ActivePlayer {
        id: SessionId::new(),
        username: username.to_owned(),
        board,
        status: GameStatus::Playing,
        timer,
        flags_count,
        mines_count: params.mines,
        started_at: now - Duration::seconds(i64::from(backdate)),
    }
}

/// Apply one tick to `player` in place.
pub fn advance(
    player: &mut ActivePlayer,
    params: SessionParams,
    entropy: &mut dyn Entropy,
    now: DateTime<Utc>,
) -> Transition {
    if player.status.is_finished() {
        if entropy.roll() > RESTART_THRESHOLD {
            restart(player, params, entropy, now);
            Transition::Restarted
        } else {
            Transition::Idle
        }
    } else if entropy.roll() > LOSS_THRESHOLD {
        player.status = GameStatus::Lost;
        Transition::Lost
    } else if entropy.roll() > WIN_THRESHOLD {
        player.status = GameStatus::Won;
        Transition::Won
    } else {
        player.timer = player.timer.saturating_add(1);
        Transition::Continued
    }
}

fn restart(
    player: &mut ActivePlayer,
    params: SessionParams,
    entropy: &mut dyn Entropy,
    now: DateTime<Utc>,
) {
    player.board = board::generate(params.rows, params.cols, entropy);
    player.status = GameStatus::Playing;
    player.timer = 0;
    player.flags_count = 0;
    player.started_at = now;
}

//! In-memory registry of spectator sessions.
//!
//! The registry holds the whole roster behind a single [`ArcSwap`]. Readers
//! load an `Arc` to the current list and keep it for as long as they like;
//! the writer builds a complete replacement list and swaps it in with one
//! pointer store. A reader therefore sees every session either entirely
//! before or entirely after a tick, never a mix.

use std::sync::Arc;

use arc_swap::ArcSwap;
use sweeper_types::{ActivePlayer, SessionId};

/// Immutable point-in-time view of every session, in roster order.
pub type Snapshot = Arc<Vec<ActivePlayer>>;

/// Fixed, ordered collection of sessions.
///
/// The roster size is set at construction and never changes.
#[derive(Debug)]
pub struct Registry {
    sessions: ArcSwap<Vec<ActivePlayer>>,
}

impl Registry {
    /// Wrap an initial roster.
    pub fn new(sessions: Vec<ActivePlayer>) -> Self {
        Self {
            sessions: ArcSwap::from_pointee(sessions),
        }
    }

    /// Snapshot of all sessions in insertion order.
    pub fn list(&self) -> Snapshot {
        self.sessions.load_full()
    }

    /// Copy of the session with `id`, or `None` if no such session exists.
    pub fn find(&self, id: SessionId) -> Option<ActivePlayer> {
        self.sessions.load().iter().find(|p| p.id == id).cloned()
    }

    /// Number of sessions.
    pub fn len(&self) -> usize {
        self.sessions.load().len()
    }

    /// Whether the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.sessions.load().is_empty()
    }

    /// Publish a complete replacement roster.
    ///
    /// Only the engine calls this, with a list derived from the previous
    /// snapshot, so the length never changes.
    pub(crate) fn replace(&self, next: Vec<ActivePlayer>) {
        debug_assert_eq!(next.len(), self.len(), "roster size is fixed");
        self.sessions.store(Arc::new(next));
    }
}

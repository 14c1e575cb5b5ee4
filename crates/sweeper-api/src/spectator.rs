//! Spectator endpoints: the simulated games anyone can watch.
//!
//! Every spectator read starts the simulation's clock loop if it is idle,
//! so an unobserved server stays quiet until the first spectator arrives.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/spectator/active` | Current roster snapshot |
//! | `GET` | `/spectator/stream` | Server-sent events, one roster snapshot per second |
//! | `GET` | `/spectator/{id}` | Single session |

use std::convert::Infallible;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt as _};
use sweeper_types::{ActivePlayer, SessionId};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

/// Every session in roster order.
pub async fn list_active(State(state): State<Arc<AppState>>) -> Json<Vec<ActivePlayer>> {
    state.engine.ensure_running().await;
    Json(Vec::clone(&state.engine.list_active_sessions()))
}

/// Push the roster as a JSON array on every publish interval.
///
/// Each event is a single `data:` line. The stream lasts until the client
/// disconnects or the server starts shutting down.
pub async fn stream_active(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("Spectator stream subscribed");
    let events = state
        .engine
        .subscribe()
        .await
        .take_until(state.closing.clone().cancelled_owned())
        .map(|json| Ok(Event::default().data(json)));
    Sse::new(events).keep_alive(KeepAlive::default())
}

/// One session by id. Ids that are not UUIDs are simply not found.
pub async fn get_player(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ActivePlayer>, ApiError> {
    state.engine.ensure_running().await;
    SessionId::parse(&id)
        .and_then(|id| state.engine.get_session(id))
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(String::from("Player not found")))
}

//! Axum router construction for the Sweeper API.
//!
//! Assembles every route into a single [`Router`] with CORS enabled for
//! the browser client.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::spectator;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// The router includes:
/// - `POST /auth/signup`, `POST /auth/login`, `POST /auth/logout`
/// - `GET /auth/me`, `GET /users` (identified by `x-user-id`)
/// - `GET /leaderboard`, `POST /leaderboard`
/// - `GET /spectator/active`, `GET /spectator/stream`, `GET /spectator/{id}`
///
/// CORS allows any origin, method, and header.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Accounts
        .route("/auth/signup", post(handlers::signup))
        .route("/auth/login", post(handlers::login))
        .route("/auth/logout", post(handlers::logout))
        .route("/auth/me", get(handlers::me))
        .route("/users", get(handlers::list_users))
        // Leaderboard
        .route(
            "/leaderboard",
            get(handlers::get_leaderboard).post(handlers::submit_score),
        )
        // Spectator (static segments win over `{id}`)
        .route("/spectator/active", get(spectator::list_active))
        .route("/spectator/stream", get(spectator::stream_active))
        .route("/spectator/{id}", get(spectator::get_player))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

//! REST endpoint handlers for accounts and the leaderboard.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/auth/signup` | Register an account |
//! | `POST` | `/auth/login` | Authenticate |
//! | `POST` | `/auth/logout` | No-op, `204` |
//! | `GET` | `/auth/me` | Account named by `x-user-id` |
//! | `GET` | `/users` | All accounts, newest first |
//! | `GET` | `/leaderboard` | Fastest entries |
//! | `POST` | `/leaderboard` | Submit a score, `201` |
//!
//! Signup and login rejections are not HTTP errors: they answer `200` with
//! `{"success": false, "error": "..."}` so the client can show the reason.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sweeper_db::{AccountError, NewAccount, NewScore};
use sweeper_types::{AuthResponse, Difficulty, LeaderboardEntry, User};
use tracing::{debug, info};
use validator::Validate;

use crate::error::ApiError;
use crate::extract::{CurrentUser, ValidJson};
use crate::state::AppState;

/// Entries returned when `limit` is absent.
pub const DEFAULT_LEADERBOARD_LIMIT: u32 = 10;

/// Largest `limit` honored; bigger values are clamped.
pub const MAX_LEADERBOARD_LIMIT: u32 = 100;

/// Largest completion time accepted, in seconds.
pub const MAX_TIME_SECONDS: u32 = 2_147_483_647;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signup`.
#[derive(Debug, serde::Deserialize, Validate)]
pub struct SignupRequest {
    /// Requested display name.
    #[validate(length(min = 1, max = 32))]
    pub username: String,
    /// Login email.
    #[validate(email)]
    pub email: String,
    /// Plaintext password.
    #[validate(length(min = 1))]
    pub password: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, serde::Deserialize, Validate)]
pub struct LoginRequest {
    /// Login email.
    #[validate(email)]
    pub email: String,
    /// Plaintext password.
    #[validate(length(min = 1))]
    pub password: String,
}

/// Request body for `POST /leaderboard`.
#[derive(Debug, serde::Deserialize, Validate)]
pub struct SubmitScoreRequest {
    /// Name to show next to the score.
    #[validate(length(min = 1, max = 32))]
    pub username: String,
    /// Completion time in seconds.
    #[validate(range(max = MAX_TIME_SECONDS))]
    pub time: u32,
    /// Board difficulty.
    pub difficulty: Difficulty,
}

/// Query parameters for `GET /leaderboard`.
#[derive(Debug, serde::Deserialize)]
pub struct LeaderboardQuery {
    /// Maximum number of entries (default 10, at most 100).
    pub limit: Option<u32>,
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Register a new account.
pub async fn signup(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<SignupRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let outcome = state
        .store
        .signup(NewAccount {
            username: &req.username,
            email: &req.email,
            password: &req.password,
        })
        .await;

    if let Ok(user) = &outcome {
        info!(user_id = %user.id, username = %user.username, "Account created");
    }
    auth_response(outcome)
}

/// Authenticate by email and password.
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let outcome = state.store.login(&req.email, &req.password).await;
    if let Err(e) = &outcome {
        debug!(reason = %e, "Login rejected");
    }
    auth_response(outcome)
}

/// Sessions are client-side; nothing to tear down.
pub async fn logout() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// The caller's own account.
pub async fn me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

/// Every account, newest first. Any known user may ask.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    CurrentUser(_caller): CurrentUser,
) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.store.list_users().await?))
}

/// Rejections become an in-band `success: false`; store failures stay errors.
fn auth_response(outcome: Result<User, AccountError>) -> Result<Json<AuthResponse>, ApiError> {
    match outcome {
        Ok(user) => Ok(Json(AuthResponse::accepted(user))),
        Err(AccountError::Db(e)) => Err(e.into()),
        Err(rejection) => Ok(Json(AuthResponse::rejected(rejection.to_string()))),
    }
}

// ---------------------------------------------------------------------------
// Leaderboard
// ---------------------------------------------------------------------------

/// The fastest entries, fastest first.
pub async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
        .min(MAX_LEADERBOARD_LIMIT);
    Ok(Json(state.store.top_scores(limit).await?))
}

/// Record a finished game.
pub async fn submit_score(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<SubmitScoreRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = state
        .store
        .submit_score(NewScore {
            username: &req.username,
            time: req.time,
            difficulty: req.difficulty,
        })
        .await?;

    info!(
        entry_id = %entry.id,
        username = %entry.username,
        time = entry.time,
        difficulty = %entry.difficulty,
        "Score submitted"
    );
    Ok((StatusCode::CREATED, Json(entry)))
}

//! Request extractors.
//!
//! - [`ValidJson`] -- JSON body that also passes [`Validate`]
//! - [`CurrentUser`] -- account named by the `x-user-id` header

use std::sync::Arc;

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use sweeper_types::{User, UserId};
use validator::Validate;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the caller's user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Message for every failed identification.
const NOT_AUTHENTICATED: &str = "Not authenticated";

/// A JSON body that deserialized and validated.
#[derive(Debug)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value
            .validate()
            .map_err(|e| ApiError::Validation(e.to_string()))?;
        Ok(Self(value))
    }
}

/// The user identified by the `x-user-id` header.
///
/// Missing, malformed, and unknown ids are all rejected with
/// `401 Not authenticated`.
#[derive(Debug)]
pub struct CurrentUser(pub User);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|raw| UserId::parse(raw.trim()))
            .ok_or_else(unauthorized)?;

        state
            .store
            .find_user(id)
            .await?
            .map(Self)
            .ok_or_else(unauthorized)
    }
}

fn unauthorized() -> ApiError {
    ApiError::Unauthorized(NOT_AUTHENTICATED.to_owned())
}

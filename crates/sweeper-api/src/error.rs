//! Error types for the HTTP API.
//!
//! [`ApiError`] unifies all failure modes into a single enum that
//! can be converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. Every
//! error body has the shape `{"error": "...", "status": 404}`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sweeper_db::DbError;

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The requested resource was not found.
    #[error("{0}")]
    NotFound(String),

    /// The caller did not identify as a known user.
    #[error("{0}")]
    Unauthorized(String),

    /// The request body was well-formed but failed validation.
    #[error("{0}")]
    Validation(String),

    /// The request body could not be read as JSON.
    #[error(transparent)]
    Json(#[from] JsonRejection),

    /// The store failed.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            Self::Json(rejection) => (rejection.status(), rejection.body_text()),
            Self::Db(DbError::OutOfRange(msg)) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            Self::Db(e) => {
                tracing::error!(error = %e, "Store request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    String::from("internal error"),
                )
            }
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

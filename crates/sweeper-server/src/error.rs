//! Error types for the server binary.
//!
//! [`ServerError`] is the top-level error type that wraps every failure
//! mode during startup and serving.

/// Top-level error for the server binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: sweeper_core::ConfigError,
    },

    /// The store could not be opened.
    #[error("store error: {source}")]
    Store {
        /// The underlying data layer error.
        #[from]
        source: sweeper_db::DbError,
    },

    /// The HTTP server failed to bind or serve.
    #[error("http error: {source}")]
    Http {
        /// The underlying server error.
        #[from]
        source: sweeper_api::ServerError,
    },
}

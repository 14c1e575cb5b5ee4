//! Error types for the data layer.
//!
//! [`DbError`] covers infrastructure failures. [`AccountError`] adds the
//! expected rejections of signup and login on top of it; those are normal
//! outcomes that the API reports in-band.

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Hashing or verifying a password failed.
    #[error("password digest error: {0}")]
    Password(String),

    /// A stored row could not be mapped back into a domain type.
    #[error("corrupt row: {0}")]
    CorruptRow(String),

    /// A value does not fit the storage representation.
    #[error("value out of range: {0}")]
    OutOfRange(String),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Outcomes of account operations other than success.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Another account already uses this email.
    #[error("Email already registered")]
    EmailTaken,

    /// Another account already uses this username.
    #[error("Username already taken")]
    UsernameTaken,

    /// No account has this email.
    #[error("User not found")]
    UnknownEmail,

    /// The password does not match.
    #[error("Invalid password")]
    WrongPassword,

    /// The underlying store failed.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl AccountError {
    /// Whether this is an expected rejection rather than a store failure.
    pub const fn is_rejection(&self) -> bool {
        !matches!(self, Self::Db(_))
    }
}

//! Argon2 password digests.
//!
//! Plaintext passwords never reach storage: accounts keep an argon2id PHC
//! string (`$argon2id$v=19$...`) that embeds its own salt and parameters.
//! Hashing is CPU-bound, so both operations run on the blocking pool.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::Rng;

use crate::error::DbError;

/// Salt length in bytes.
const SALT_LEN: usize = 16;

/// Produce a PHC digest for `plain` with a fresh random salt.
pub async fn hash_password(plain: &str) -> Result<String, DbError> {
    let plain = plain.to_owned();
    tokio::task::spawn_blocking(move || hash_blocking(&plain))
        .await
        .map_err(|e| DbError::Password(format!("hashing task failed: {e}")))?
}

/// Check `plain` against a stored PHC digest.
///
/// Returns `Ok(false)` on mismatch; `Err` only when the digest itself is
/// unreadable.
pub async fn verify_password(plain: &str, digest: &str) -> Result<bool, DbError> {
    let plain = plain.to_owned();
    let digest = digest.to_owned();
    tokio::task::spawn_blocking(move || verify_blocking(&plain, &digest))
        .await
        .map_err(|e| DbError::Password(format!("verify task failed: {e}")))?
}

fn hash_blocking(plain: &str) -> Result<String, DbError> {
    let salt_bytes: [u8; SALT_LEN] = rand::rng().random();
    let salt =
        SaltString::encode_b64(&salt_bytes).map_err(|e| DbError::Password(e.to_string()))?;
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DbError::Password(e.to_string()))
}

fn verify_blocking(plain: &str, digest: &str) -> Result<bool, DbError> {
    let parsed = PasswordHash::new(digest).map_err(|e| DbError::Password(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

//! Password hashing and verification
//!
//! Digests are Argon2id PHC strings (`$argon2id$v=19$...`) carrying their
//! own salt and cost parameters, so verification needs nothing but the
//! stored string.

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::error;

/// Errors raised while producing a digest
#[derive(Error, Debug)]
pub enum PasswordError {
    /// Argon2 rejected the input or failed to allocate
    #[error("Failed to hash password: {0}")]
    Hash(String),

    /// The blocking hashing task did not complete
    #[error("Password hashing task failed: {0}")]
    Task(String),
}

/// Hash a password with a fresh random salt
pub fn hash(plaintext: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Check a password against a stored digest
///
/// Returns false on mismatch and on a digest that does not parse.
pub fn verify(plaintext: &str, digest: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(digest) else {
        return false;
    };

    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}

/// [`hash`] on the blocking thread pool
pub async fn hash_async(plaintext: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash(&plaintext))
        .await
        .map_err(|e| {
            error!("Password hash task panicked: {}", e);
            PasswordError::Task(e.to_string())
        })?
}

/// [`verify`] on the blocking thread pool
///
/// A failed task counts as a mismatch.
pub async fn verify_async(plaintext: String, digest: String) -> bool {
    tokio::task::spawn_blocking(move || verify(&plaintext, &digest))
        .await
        .unwrap_or_else(|e| {
            error!("Password verify task panicked: {}", e);
            false
        })
}

/// Digest checked when no account matches the submitted email
fn decoy_digest() -> Option<&'static str> {
    static DECOY: OnceLock<Option<String>> = OnceLock::new();
    DECOY
        .get_or_init(|| hash("decoy-password-for-unknown-accounts").ok())
        .as_deref()
}

/// Spend one verification on a password that has no account to match
///
/// Keeps a login for an unknown email as slow as a wrong password.
pub async fn verify_decoy_async(plaintext: String) {
    let result = tokio::task::spawn_blocking(move || {
        if let Some(digest) = decoy_digest() {
            verify(&plaintext, digest);
        }
    })
    .await;

    if let Err(e) = result {
        error!("Decoy verify task panicked: {}", e);
    }
}

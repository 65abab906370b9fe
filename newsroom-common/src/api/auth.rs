//! Credential hashing and session tokens
//!
//! # Pure Functions
//!
//! This module contains ONLY pure functions. Cookie handling and request
//! guards live in the server crate.
//!
//! Password storage layout matches the `users` table: a random per-user salt
//! (`password_salt`, 32 hex chars) and an iterated SHA-256 digest
//! (`password_hash`, 64 hex chars).

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Number of SHA-256 rounds applied to a salted password
pub const HASH_ROUNDS: u32 = 10_000;

/// Minimum password length accepted at registration
pub const MIN_PASSWORD_LEN: usize = 6;

// ========================================
// Error Types
// ========================================

/// Credential error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CredentialError {
    #[error("Password must be at least {0} characters")]
    PasswordTooShort(usize),

    #[error("Stored salt is not valid hex")]
    MalformedSalt,
}

// ========================================
// Salts and Tokens
// ========================================

fn random_hex(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill_bytes(&mut buf);
    to_hex(&buf)
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Generate a fresh 128-bit password salt as hex
pub fn generate_salt() -> String {
    random_hex(16)
}

/// Generate a 256-bit session token as hex
///
/// # Examples
///
/// ```
/// use newsroom_common::api::auth::generate_session_token;
///
/// let token = generate_session_token();
/// assert_eq!(token.len(), 64);
/// assert_ne!(token, generate_session_token());
/// ```
pub fn generate_session_token() -> String {
    random_hex(32)
}

// ========================================
// Password Hashing
// ========================================

/// Hash a password with the given hex salt
///
/// Round 1 digests `salt || password`; every following round digests
/// `previous || salt`.
pub fn hash_password(password: &str, salt: &str) -> Result<String, CredentialError> {
    if salt.is_empty() || salt.len() % 2 != 0 || !salt.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CredentialError::MalformedSalt);
    }

    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    let mut digest = hasher.finalize();

    for _ in 1..HASH_ROUNDS {
        let mut hasher = Sha256::new();
        hasher.update(digest);
        hasher.update(salt.as_bytes());
        digest = hasher.finalize();
    }

    Ok(to_hex(&digest))
}

/// Produce `(hash, salt)` for a new password
pub fn create_credentials(password: &str) -> Result<(String, String), CredentialError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CredentialError::PasswordTooShort(MIN_PASSWORD_LEN));
    }
    let salt = generate_salt();
    let hash = hash_password(password, &salt)?;
    Ok((hash, salt))
}

/// Check a password against a stored hash and salt
///
/// Comparison runs over the full length regardless of where the first
/// mismatch occurs.
pub fn verify_password(password: &str, salt: &str, stored_hash: &str) -> bool {
    let Ok(calculated) = hash_password(password, salt) else {
        return false;
    };
    constant_time_eq(calculated.as_bytes(), stored_hash.as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

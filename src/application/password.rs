//! Argon2id password credentials. Plaintext passwords are never stored.

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use crate::app_error::{AppError, AppResult};

/// Hashes a plaintext password with a fresh random salt, returning a PHC string.
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {e}")))
}

/// True iff `password` matches `credential`. A malformed credential never matches.
pub fn verify_password(password: &str, credential: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(credential) else {
        tracing::warn!("Stored password credential is not a valid PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Stands in for the credential of a user that does not exist.
static ABSENT_USER_CREDENTIAL: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("absent-user-credential").ok());

/// Runs a full Argon2 verification against a throwaway credential and always returns false,
/// so a login for an unknown username costs as much as one with a wrong password.
pub fn verify_absent_user(password: &str) -> bool {
    if let Some(credential) = ABSENT_USER_CREDENTIAL.as_deref() {
        let _ = verify_password(password, credential);
    }
    false
}

//! Password hashing.
//!
//! Argon2id with per-password random salts, stored as PHC strings. The raw
//! password never leaves this module's function arguments.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{Error as HashError, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

use crate::error::{AuthError, AuthResult};

/// Hashes a password into a self-describing PHC string.
pub fn hash_password(password: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AuthError::internal(format!("password hashing failed: {err}")))
}

/// Verifies a password against a stored PHC string.
///
/// A wrong password is `Ok(false)`; only an unparseable or corrupt stored
/// hash is an error.
pub fn verify_password(password: &str, stored: &str) -> AuthResult<bool> {
    let parsed = PasswordHash::new(stored)
        .map_err(|err| AuthError::internal(format!("stored password hash is corrupt: {err}")))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(HashError::Password) => Ok(false),
        Err(err) => Err(AuthError::internal(format!(
            "password verification failed: {err}"
        ))),
    }
}

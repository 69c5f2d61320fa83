//! # Password Service
//!
//! Argon2 hashing and verification for stored user credentials. Hashes are
//! written at signup time (outside this service's HTTP surface) and verified
//! by the session endpoint. The PHC string format keeps salt and parameters
//! embedded in the hash itself.

use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use tracing::instrument;

/// Hashes a plaintext password with a fresh random salt.
///
/// # Errors
///
/// Returns [`argon2::password_hash::Error`] if hashing fails, which only
/// happens on invalid parameters or an exhausted entropy source.
#[instrument(skip(password))]
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(password_hash.to_string())
}

/// Verifies a plaintext password against a stored PHC-format hash.
///
/// A mismatch is a regular `Ok(false)`; only malformed hashes or parameter
/// problems surface as errors.
#[instrument(skip(password, hash))]
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

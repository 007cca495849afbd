//! Password verification against stored Argon2id hashes.
//!
//! Hashing itself happens where users are written (the user repository);
//! both sides must agree on the pepper.

use std::borrow::Cow;

use argon2::{Argon2, PasswordHash, PasswordVerifier};

use crate::error::AuthError;

fn peppered<'a>(password: &'a str, pepper: Option<&str>) -> Cow<'a, str> {
    match pepper {
        Some(p) => Cow::Owned(format!("{p}{password}")),
        None => Cow::Borrowed(password),
    }
}

/// Verify a plaintext password against a PHC-format hash.
///
/// Algorithm parameters come from the hash string itself. Returns
/// `Ok(false)` on mismatch and `Err(AuthError::Crypto)` if the stored hash
/// cannot be parsed.
pub fn verify_password(
    password: &str,
    hash: &str,
    pepper: Option<&str>,
) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AuthError::Crypto(format!("invalid hash format: {e}")))?;

    match Argon2::default().verify_password(peppered(password, pepper).as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Crypto(format!("verify error: {e}"))),
    }
}

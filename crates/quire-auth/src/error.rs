//! Authentication error types.

use quire_core::error::QuireError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password; the two are never distinguished.
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for QuireError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::TokenExpired
            | AuthError::TokenInvalid(_) => QuireError::AuthenticationFailed {
                reason: err.to_string(),
            },
            AuthError::Crypto(msg) => QuireError::Crypto(msg),
        }
    }
}

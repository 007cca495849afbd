//! Authentication configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Configuration for the authentication service.
///
/// Loaded once at start-up and shared read-only afterwards.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret for HS256 token signing. Must not be empty.
    pub jwt_secret: String,
    /// Token lifetime in seconds (default: 86_400 = 24 hours).
    pub token_lifetime_secs: u64,
    /// JWT issuer (`iss` claim).
    pub jwt_issuer: String,
    /// Name of the HTTP-only cookie carrying the token.
    pub cookie_name: String,
    /// Mark the cookie `Secure` (HTTPS only).
    pub cookie_secure: bool,
    /// Optional pepper prepended to passwords before Argon2id hashing.
    pub pepper: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_lifetime_secs: 86_400,
            jwt_issuer: "quire".into(),
            cookie_name: "auth_token".into(),
            cookie_secure: false,
            pepper: None,
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_lifetime_secs", &self.token_lifetime_secs)
            .field("jwt_issuer", &self.jwt_issuer)
            .field("cookie_name", &self.cookie_name)
            .field("cookie_secure", &self.cookie_secure)
            .field("pepper", &self.pepper.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

//! JWT issuance and verification (HS256).

use std::sync::Once;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use quire_core::models::user::User;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// JWT claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject: user ID (UUID string).
    pub sub: String,
    pub email: String,
    /// `admin` or `editor`.
    pub role: String,
    /// Tenant scope the token was issued in; empty in single-tenant mode.
    pub tenant_id: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    /// Unique token ID.
    pub jti: String,
}

impl AccessTokenClaims {
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.sub)
            .map_err(|e| AuthError::TokenInvalid(format!("bad subject: {e}")))
    }
}

static CRYPTO_PROVIDER: Once = Once::new();

/// Install the RustCrypto backend as jsonwebtoken's process default.
///
/// Other crates in the dependency graph enable the `aws_lc_rs` backend as
/// well, and with both features on jsonwebtoken refuses to pick one itself.
fn ensure_crypto_provider() {
    CRYPTO_PROVIDER.call_once(|| {
        // Err means a provider is already installed, which is fine.
        jsonwebtoken::crypto::rust_crypto::DEFAULT_PROVIDER
            .install_default()
            .ok();
    });
}

fn secret(config: &AuthConfig) -> Result<&[u8], AuthError> {
    if config.jwt_secret.is_empty() {
        return Err(AuthError::Crypto("JWT secret is not configured".into()));
    }
    Ok(config.jwt_secret.as_bytes())
}

/// Sign `claims` as-is.
pub fn encode_claims(
    claims: &AccessTokenClaims,
    config: &AuthConfig,
) -> Result<String, AuthError> {
    ensure_crypto_provider();
    let key = EncodingKey::from_secret(secret(config)?);
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &key)
        .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
}

/// Issue a signed token for `user` within `tenant_id`.
pub fn issue_access_token(
    user: &User,
    tenant_id: &str,
    config: &AuthConfig,
) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    let claims = AccessTokenClaims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        role: user.role.as_str().to_string(),
        tenant_id: tenant_id.to_string(),
        iss: config.jwt_issuer.clone(),
        iat: now,
        exp: now + config.token_lifetime_secs as i64,
        jti: Uuid::new_v4().to_string(),
    };
    encode_claims(&claims, config)
}

/// Decode and verify a token: signature, expiry and issuer.
pub fn decode_access_token(
    token: &str,
    config: &AuthConfig,
) -> Result<AccessTokenClaims, AuthError> {
    ensure_crypto_provider();
    let key = DecodingKey::from_secret(secret(config)?);

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&config.jwt_issuer]);
    validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);

    jsonwebtoken::decode::<AccessTokenClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid(e.to_string()),
        })
}

/// Validated JWT claims: a newtype proving the token was verified.
#[derive(Debug, Clone)]
pub struct ValidatedClaims(pub AccessTokenClaims);

/// Entry point for request authentication. Stateless: no database lookup.
pub fn validate_access_token(
    token: &str,
    config: &AuthConfig,
) -> Result<ValidatedClaims, AuthError> {
    decode_access_token(token, config).map(ValidatedClaims)
}

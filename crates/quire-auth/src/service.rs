//! Authentication service: login and caller lookup.

use std::sync::Arc;

use quire_core::error::{QuireError, QuireResult};
use quire_core::models::user::User;
use quire_core::repository::UserRepository;
use tracing::{debug, warn};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token::{self, AccessTokenClaims};

/// Input for the login flow.
#[derive(Debug)]
pub struct LoginInput {
    /// Scope the issued token will be bound to.
    pub tenant_id: String,
    pub email: String,
    pub password: String,
}

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    /// Signed JWT.
    pub access_token: String,
    /// Token lifetime in seconds.
    pub expires_in: u64,
    pub user: User,
}

/// Authentication service.
///
/// Generic over the user repository so that the auth layer has no
/// dependency on the database crate.
pub struct AuthService<U: UserRepository> {
    user_repo: U,
    config: Arc<AuthConfig>,
}

impl<U: UserRepository> AuthService<U> {
    pub fn new(user_repo: U, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    /// Verify email + password and issue a token.
    ///
    /// Unknown emails and wrong passwords fail identically.
    pub async fn login(&self, input: LoginInput) -> QuireResult<LoginOutput> {
        let user = match self.user_repo.get_by_email(&input.email).await {
            Ok(user) => user,
            Err(QuireError::NotFound { .. }) => {
                debug!("Login attempt for unknown email");
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        let valid = password::verify_password(
            &input.password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )?;
        if !valid {
            warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        let access_token = token::issue_access_token(&user, &input.tenant_id, &self.config)?;
        debug!(user_id = %user.id, tenant_id = %input.tenant_id, "Login succeeded");

        Ok(LoginOutput {
            access_token,
            expires_in: self.config.token_lifetime_secs,
            user,
        })
    }

    /// The user a verified token was issued to.
    ///
    /// A token whose user has since been deleted no longer authenticates.
    pub async fn me(&self, claims: &AccessTokenClaims) -> QuireResult<User> {
        let user_id = claims.user_id()?;
        match self.user_repo.get_by_id(user_id).await {
            Ok(user) => Ok(user),
            Err(QuireError::NotFound { .. }) => {
                Err(AuthError::TokenInvalid("user no longer exists".into()).into())
            }
            Err(e) => Err(e),
        }
    }
}

use axum::Json;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::response::IntoResponse;
use cookie::{Cookie, SameSite};
use quire_auth::{AuthConfig, AuthService, LoginInput};
use quire_core::models::user::User;
use quire_db::repository::SurrealUserRepository;
use serde::{Deserialize, Serialize};
use surrealdb::engine::any::Any;
use tracing::info;

use crate::api::error::ApiResult;
use crate::api::extract::{ApiJson, AuthUser, Tenant};
use crate::api::state::AppState;

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SessionResponse {
    success: bool,
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_in: Option<u64>,
}

fn service(state: &AppState, tenant: &Tenant) -> AuthService<SurrealUserRepository<Any>> {
    let users =
        SurrealUserRepository::with_pepper(tenant.0.db.clone(), state.auth.pepper.clone());
    AuthService::new(users, state.auth.clone())
}

fn session_cookie(config: &AuthConfig, token: String) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), token))
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(cookie::time::Duration::seconds(
            config.token_lifetime_secs as i64,
        ))
        .build()
}

fn cleared_cookie(config: &AuthConfig) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), ""))
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(cookie::time::Duration::ZERO)
        .build()
}

pub(crate) async fn login(
    State(state): State<AppState>,
    tenant: Tenant,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let output = service(&state, &tenant)
        .login(LoginInput {
            tenant_id: tenant.id().to_string(),
            email: body.email,
            password: body.password,
        })
        .await?;

    info!(user_id = %output.user.id, tenant_id = %tenant.id(), "User logged in");

    let cookie = session_cookie(&state.auth, output.access_token);
    Ok((
        [(SET_COOKIE, cookie.to_string())],
        Json(SessionResponse {
            success: true,
            message: "Login successful",
            user: Some(output.user),
            expires_in: Some(output.expires_in),
        }),
    ))
}

pub(crate) async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(SET_COOKIE, cleared_cookie(&state.auth).to_string())],
        Json(SessionResponse {
            success: true,
            message: "Logged out successfully",
            user: None,
            expires_in: None,
        }),
    )
}

pub(crate) async fn me(
    State(state): State<AppState>,
    tenant: Tenant,
    caller: AuthUser,
) -> ApiResult<Json<SessionResponse>> {
    let user = service(&state, &tenant).me(&caller.claims).await?;
    Ok(Json(SessionResponse {
        success: true,
        message: "Authenticated",
        user: Some(user),
        expires_in: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_attributes() {
        let config = AuthConfig::default();
        let rendered = session_cookie(&config, "tok".into()).to_string();
        assert!(rendered.starts_with("auth_token=tok"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("SameSite=Lax"));
        assert!(rendered.contains("Path=/"));
        assert!(rendered.contains("Max-Age=86400"));
        assert!(!rendered.contains("Secure"));
    }

    #[test]
    fn cleared_cookie_expires_immediately() {
        let rendered = cleared_cookie(&AuthConfig::default()).to_string();
        assert!(rendered.starts_with("auth_token=;"));
        assert!(rendered.contains("Max-Age=0"));
    }
}

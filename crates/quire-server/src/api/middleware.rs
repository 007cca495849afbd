//! Request middleware: tenant resolution and credential verification.

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::http::header::{AUTHORIZATION, COOKIE, HOST};
use axum::middleware::Next;
use axum::response::Response;
use cookie::Cookie;
use quire_auth::token::validate_access_token;
use quire_core::tenant::resolve_tenant_id;
use quire_db::TenantScope;
use tracing::{Span, debug};

use super::error::ApiError;
use super::extract::AuthUser;
use super::state::AppState;

/// Header naming the tenant explicitly.
pub const TENANT_HEADER: &str = "x-tenant-id";

/// Resolve the tenant for the request and attach its [`TenantScope`].
///
/// Only installed in multi-tenant mode.
pub async fn resolve_tenant(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let headers = req.headers();
    let header = headers.get(TENANT_HEADER).and_then(|v| v.to_str().ok());
    let host = headers.get(HOST).and_then(|v| v.to_str().ok());
    let tenant_id = resolve_tenant_id(header, host);

    let scope = state.resolver.scope_for(&tenant_id).await?;
    Span::current().record("tenant_id", scope.tenant_id.as_str());
    req.extensions_mut().insert(scope);
    Ok(next.run(req).await)
}

/// Reject requests without a valid token for the current tenant; attach
/// the caller as [`AuthUser`] otherwise.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = credential(req.headers(), &state.auth.cookie_name)
        .ok_or_else(|| ApiError::unauthorized("authentication required"))?;

    let claims = validate_access_token(&token, &state.auth)?.0;

    let scope_tenant = req
        .extensions()
        .get::<TenantScope>()
        .map(|scope| scope.tenant_id.clone())
        .unwrap_or_default();
    if claims.tenant_id != scope_tenant {
        debug!(
            token_tenant = %claims.tenant_id,
            request_tenant = %scope_tenant,
            "Token presented outside its tenant"
        );
        return Err(ApiError::unauthorized("token was issued for another tenant"));
    }

    let user_id = claims.user_id()?;
    let role = claims
        .role
        .parse()
        .map_err(|_| ApiError::unauthorized("invalid token: unknown role"))?;

    req.extensions_mut().insert(AuthUser {
        user_id,
        email: claims.email.clone(),
        role,
        claims,
    });
    Ok(next.run(req).await)
}

/// Token from the auth cookie, falling back to an `Authorization: Bearer`
/// header.
fn credential(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let from_cookie = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == cookie_name && !c.value().is_empty())
        .map(|c| c.value().to_string());

    from_cookie.or_else(|| {
        let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
        let token = value.strip_prefix("Bearer ")?.trim();
        (!token.is_empty()).then(|| token.to_string())
    })
}

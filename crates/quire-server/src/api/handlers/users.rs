//! User management. Every route here is restricted to administrators.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use quire_core::models::user::{CreateUser, UpdateUser, User};
use quire_core::repository::{PaginatedResult, UserRepository};
use quire_db::repository::SurrealUserRepository;
use surrealdb::engine::any::Any;
use tracing::info;
use uuid::Uuid;

use super::PageQuery;
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{ApiJson, ApiPath, ApiQuery, AuthUser, Tenant};
use crate::api::state::AppState;

fn repo(state: &AppState, tenant: &Tenant) -> SurrealUserRepository<Any> {
    SurrealUserRepository::with_pepper(tenant.0.db.clone(), state.auth.pepper.clone())
}

pub(crate) async fn create(
    State(state): State<AppState>,
    tenant: Tenant,
    caller: AuthUser,
    ApiJson(body): ApiJson<CreateUser>,
) -> ApiResult<(StatusCode, Json<User>)> {
    caller.require_admin()?;
    let user = repo(&state, &tenant).create(body).await?;
    info!(user_id = %user.id, created_by = %caller.user_id, "User created");
    Ok((StatusCode::CREATED, Json(user)))
}

pub(crate) async fn list(
    State(state): State<AppState>,
    tenant: Tenant,
    caller: AuthUser,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Json<PaginatedResult<User>>> {
    caller.require_admin()?;
    Ok(Json(repo(&state, &tenant).list(query.pagination()).await?))
}

pub(crate) async fn get(
    State(state): State<AppState>,
    tenant: Tenant,
    caller: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<User>> {
    caller.require_admin()?;
    Ok(Json(repo(&state, &tenant).get_by_id(id).await?))
}

pub(crate) async fn update(
    State(state): State<AppState>,
    tenant: Tenant,
    caller: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateUser>,
) -> ApiResult<Json<User>> {
    caller.require_admin()?;
    let user = repo(&state, &tenant).update(id, body).await?;
    info!(user_id = %id, updated_by = %caller.user_id, "User updated");
    Ok(Json(user))
}

pub(crate) async fn delete(
    State(state): State<AppState>,
    tenant: Tenant,
    caller: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    caller.require_admin()?;
    if id == caller.user_id {
        return Err(ApiError::bad_request("you cannot delete your own account"));
    }
    repo(&state, &tenant).delete(id).await?;
    info!(user_id = %id, deleted_by = %caller.user_id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

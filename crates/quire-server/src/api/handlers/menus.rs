use axum::Json;
use axum::http::StatusCode;
use quire_core::models::menu::{CreateMenu, Menu, MenuItem, UpdateMenu};
use quire_core::repository::{MenuRepository, PaginatedResult};
use quire_db::repository::SurrealMenuRepository;
use serde::Deserialize;
use surrealdb::engine::any::Any;
use tracing::info;
use uuid::Uuid;

use super::PageQuery;
use crate::api::error::ApiResult;
use crate::api::extract::{ApiJson, ApiPath, ApiQuery, Tenant};

#[derive(Debug, Deserialize)]
pub(crate) struct CreateMenuRequest {
    #[serde(default)]
    id: Option<Uuid>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    items: Vec<MenuItem>,
}

fn repo(tenant: &Tenant) -> SurrealMenuRepository<Any> {
    SurrealMenuRepository::new(tenant.0.db.clone())
}

pub(crate) async fn create(
    tenant: Tenant,
    ApiJson(body): ApiJson<CreateMenuRequest>,
) -> ApiResult<(StatusCode, Json<Menu>)> {
    let menu = repo(&tenant)
        .create(CreateMenu {
            id: body.id,
            tenant_id: tenant.id().to_string(),
            name: body.name,
            description: body.description,
            items: body.items,
        })
        .await?;
    info!(menu_id = %menu.id, "Menu created");
    Ok((StatusCode::CREATED, Json(menu)))
}

pub(crate) async fn list(
    tenant: Tenant,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Json<PaginatedResult<Menu>>> {
    Ok(Json(
        repo(&tenant)
            .list(tenant.id(), query.pagination())
            .await?,
    ))
}

pub(crate) async fn get(tenant: Tenant, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Json<Menu>> {
    Ok(Json(repo(&tenant).get_by_id(tenant.id(), id).await?))
}

pub(crate) async fn update(
    tenant: Tenant,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateMenu>,
) -> ApiResult<Json<Menu>> {
    Ok(Json(repo(&tenant).update(tenant.id(), id, body).await?))
}

pub(crate) async fn delete(
    tenant: Tenant,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    repo(&tenant).delete(tenant.id(), id).await?;
    info!(menu_id = %id, "Menu deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Menus are not publishable; any menu of the tenant can be rendered.
pub(crate) async fn public_get(
    tenant: Tenant,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Menu>> {
    get(tenant, ApiPath(id)).await
}

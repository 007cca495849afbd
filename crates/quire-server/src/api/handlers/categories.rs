use axum::Json;
use axum::http::StatusCode;
use quire_core::models::category::{Category, CreateCategory, UpdateCategory};
use quire_core::repository::{CategoryRepository, PaginatedResult, Pagination};
use quire_db::repository::SurrealCategoryRepository;
use serde::Deserialize;
use surrealdb::engine::any::Any;
use tracing::info;
use uuid::Uuid;

use super::PageQuery;
use crate::api::error::ApiResult;
use crate::api::extract::{ApiJson, ApiPath, ApiQuery, Tenant};

#[derive(Debug, Deserialize)]
pub(crate) struct CreateCategoryRequest {
    #[serde(default)]
    id: Option<Uuid>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    slug: String,
    #[serde(default)]
    description: String,
}

fn repo(tenant: &Tenant) -> SurrealCategoryRepository<Any> {
    SurrealCategoryRepository::new(tenant.0.db.clone())
}

pub(crate) async fn create(
    tenant: Tenant,
    ApiJson(body): ApiJson<CreateCategoryRequest>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let category = repo(&tenant)
        .create(CreateCategory {
            id: body.id,
            tenant_id: tenant.id().to_string(),
            name: body.name,
            slug: body.slug,
            description: body.description,
        })
        .await?;
    info!(category_id = %category.id, slug = %category.slug, "Category created");
    Ok((StatusCode::CREATED, Json(category)))
}

pub(crate) async fn list(
    tenant: Tenant,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<Json<PaginatedResult<Category>>> {
    Ok(Json(
        repo(&tenant)
            .list(tenant.id(), query.pagination())
            .await?,
    ))
}

/// Every category, for navigation and filters.
pub(crate) async fn public_list(tenant: Tenant) -> ApiResult<Json<Vec<Category>>> {
    let page = repo(&tenant)
        .list(tenant.id(), Pagination::unbounded())
        .await?;
    Ok(Json(page.items))
}

pub(crate) async fn get(
    tenant: Tenant,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Category>> {
    Ok(Json(repo(&tenant).get_by_id(tenant.id(), id).await?))
}

pub(crate) async fn update(
    tenant: Tenant,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateCategory>,
) -> ApiResult<Json<Category>> {
    Ok(Json(repo(&tenant).update(tenant.id(), id, body).await?))
}

/// Also unlinks the category from every post.
pub(crate) async fn delete(
    tenant: Tenant,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    repo(&tenant).delete(tenant.id(), id).await?;
    info!(category_id = %id, "Category deleted");
    Ok(StatusCode::NO_CONTENT)
}

use axum::Json;
use axum::http::StatusCode;
use quire_core::QuireError;
use quire_core::block::Block;
use quire_core::models::page::{CreatePage, Page, PageListOptions, UpdatePage};
use quire_core::repository::{PageRepository, PaginatedResult, Pagination};
use quire_db::repository::SurrealPageRepository;
use serde::Deserialize;
use surrealdb::engine::any::Any;
use tracing::info;
use uuid::Uuid;

use super::parse_status;
use crate::api::error::ApiResult;
use crate::api::extract::{ApiJson, ApiPath, ApiQuery, AuthUser, Tenant};

#[derive(Debug, Deserialize)]
pub(crate) struct CreatePageRequest {
    #[serde(default)]
    id: Option<Uuid>,
    #[serde(default)]
    slug: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    blocks: Vec<Block>,
    #[serde(default)]
    meta: Option<serde_json::Value>,
}

/// Absent fields stay untouched; `blocks: []` clears the content.
#[derive(Debug, Deserialize)]
pub(crate) struct UpdatePageRequest {
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    blocks: Option<Vec<Block>>,
    #[serde(default)]
    meta: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PageListQuery {
    limit: Option<i64>,
    offset: Option<i64>,
    status: Option<String>,
    search: Option<String>,
}

fn repo(tenant: &Tenant) -> SurrealPageRepository<Any> {
    SurrealPageRepository::new(tenant.0.db.clone())
}

pub(crate) async fn create(
    tenant: Tenant,
    caller: AuthUser,
    ApiJson(body): ApiJson<CreatePageRequest>,
) -> ApiResult<(StatusCode, Json<Page>)> {
    let page = repo(&tenant)
        .create(CreatePage {
            id: body.id,
            tenant_id: tenant.id().to_string(),
            slug: body.slug,
            title: body.title,
            status: parse_status(body.status.as_deref())?,
            blocks: body.blocks,
            meta: body.meta,
        })
        .await?;
    info!(page_id = %page.id, user_id = %caller.user_id, "Page created");
    Ok((StatusCode::CREATED, Json(page)))
}

pub(crate) async fn list(
    tenant: Tenant,
    ApiQuery(query): ApiQuery<PageListQuery>,
) -> ApiResult<Json<PaginatedResult<Page>>> {
    let options = PageListOptions {
        pagination: Pagination::from_query(query.limit, query.offset),
        status: parse_status(query.status.as_deref())?,
        search: query.search,
    };
    Ok(Json(repo(&tenant).list(tenant.id(), options).await?))
}

pub(crate) async fn get(tenant: Tenant, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Json<Page>> {
    Ok(Json(repo(&tenant).get_by_id(tenant.id(), id).await?))
}

pub(crate) async fn update(
    tenant: Tenant,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdatePageRequest>,
) -> ApiResult<Json<Page>> {
    let input = UpdatePage {
        slug: body.slug,
        title: body.title,
        status: parse_status(body.status.as_deref())?,
        blocks: body.blocks,
        meta: body.meta,
    };
    Ok(Json(repo(&tenant).update(tenant.id(), id, input).await?))
}

pub(crate) async fn delete(
    tenant: Tenant,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    repo(&tenant).delete(tenant.id(), id).await?;
    info!(page_id = %id, "Page deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn publish(
    tenant: Tenant,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Page>> {
    Ok(Json(repo(&tenant).publish(tenant.id(), id).await?))
}

pub(crate) async fn unpublish(
    tenant: Tenant,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Page>> {
    Ok(Json(repo(&tenant).unpublish(tenant.id(), id).await?))
}

/// Published page by slug. Drafts and archived pages are reported as
/// missing.
pub(crate) async fn public_by_slug(
    tenant: Tenant,
    ApiPath(slug): ApiPath<String>,
) -> ApiResult<Json<Page>> {
    let slug = slug.trim_matches('/');
    let page = repo(&tenant).get_by_slug(tenant.id(), slug).await?;
    if !page.status.is_published() {
        return Err(QuireError::not_found("page", format!("slug={slug}")).into());
    }
    Ok(Json(page))
}

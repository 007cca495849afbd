use axum::Json;
use axum::http::StatusCode;
use quire_core::models::post::{CreatePost, Post, PostListOptions, PostStatus, UpdatePost};
use quire_core::repository::{PaginatedResult, Pagination, PostRepository};
use quire_db::repository::SurrealPostRepository;
use serde::Deserialize;
use surrealdb::engine::any::Any;
use tracing::info;
use uuid::Uuid;

use super::parse_status;
use crate::api::error::ApiResult;
use crate::api::extract::{ApiJson, ApiPath, ApiQuery, AuthUser, Tenant};

#[derive(Debug, Deserialize)]
pub(crate) struct CreatePostRequest {
    #[serde(default)]
    id: Option<Uuid>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    slug: String,
    #[serde(default)]
    excerpt: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    featured_image: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    category_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpdatePostRequest {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    excerpt: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    featured_image: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    category_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostListQuery {
    limit: Option<i64>,
    offset: Option<i64>,
    status: Option<String>,
    category_id: Option<Uuid>,
}

fn repo(tenant: &Tenant) -> SurrealPostRepository<Any> {
    SurrealPostRepository::new(tenant.0.db.clone())
}

/// The caller becomes the author.
pub(crate) async fn create(
    tenant: Tenant,
    caller: AuthUser,
    ApiJson(body): ApiJson<CreatePostRequest>,
) -> ApiResult<(StatusCode, Json<Post>)> {
    let post = repo(&tenant)
        .create(CreatePost {
            id: body.id,
            tenant_id: tenant.id().to_string(),
            title: body.title,
            slug: body.slug,
            excerpt: body.excerpt,
            content: body.content,
            featured_image: body.featured_image,
            status: parse_status(body.status.as_deref())?,
            author_id: Some(caller.user_id),
            category_ids: body.category_ids,
        })
        .await?;
    info!(post_id = %post.id, author_id = %caller.user_id, "Post created");
    Ok((StatusCode::CREATED, Json(post)))
}

pub(crate) async fn list(
    tenant: Tenant,
    ApiQuery(query): ApiQuery<PostListQuery>,
) -> ApiResult<Json<PaginatedResult<Post>>> {
    let options = PostListOptions {
        pagination: Pagination::from_query(query.limit, query.offset),
        status: parse_status(query.status.as_deref())?,
        category_id: query.category_id,
    };
    Ok(Json(repo(&tenant).list(tenant.id(), options).await?))
}

pub(crate) async fn get(tenant: Tenant, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Json<Post>> {
    Ok(Json(repo(&tenant).get_by_id(tenant.id(), id).await?))
}

pub(crate) async fn update(
    tenant: Tenant,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdatePostRequest>,
) -> ApiResult<Json<Post>> {
    let input = UpdatePost {
        title: body.title,
        slug: body.slug,
        excerpt: body.excerpt,
        content: body.content,
        featured_image: body.featured_image,
        status: parse_status(body.status.as_deref())?,
        category_ids: body.category_ids,
    };
    Ok(Json(repo(&tenant).update(tenant.id(), id, input).await?))
}

pub(crate) async fn delete(
    tenant: Tenant,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    repo(&tenant).delete(tenant.id(), id).await?;
    info!(post_id = %id, "Post deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Published posts only; `status` in the query is ignored.
pub(crate) async fn public_list(
    tenant: Tenant,
    ApiQuery(query): ApiQuery<PostListQuery>,
) -> ApiResult<Json<PaginatedResult<Post>>> {
    let options = PostListOptions {
        pagination: Pagination::from_query(query.limit, query.offset),
        status: Some(PostStatus::Published),
        category_id: query.category_id,
    };
    Ok(Json(repo(&tenant).list(tenant.id(), options).await?))
}

pub(crate) async fn public_by_slug(
    tenant: Tenant,
    ApiPath(slug): ApiPath<String>,
) -> ApiResult<Json<Post>> {
    Ok(Json(
        repo(&tenant)
            .get_published_by_slug(tenant.id(), &slug)
            .await?,
    ))
}

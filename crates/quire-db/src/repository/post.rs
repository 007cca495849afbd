//! SurrealDB implementation of [`PostRepository`].
//!
//! Category membership is a `categorized_as` graph edge (post -> category).
//! Writes that touch both the post row and its edges run inside a single
//! transaction.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use quire_core::error::{QuireError, QuireResult};
use quire_core::models::category::Category;
use quire_core::models::post::{CreatePost, Post, PostListOptions, PostStatus, UpdatePost};
use quire_core::repository::{CategoryRepository, PaginatedResult, PostRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use super::category::{CategoryRow, SurrealCategoryRepository};
use super::{CountRow, UniqueIndex, parse_uuid, record_exists, required};
use crate::error::DbError;

const SELECT_POST: &str = "SELECT meta::id(id) AS record_id, * \
     FROM type::record('post', $id) WHERE tenant_id = $tenant_id";

const SLUG: UniqueIndex = UniqueIndex {
    entity: "post",
    name: "idx_post_slug",
    field: "slug",
};

#[derive(Debug, SurrealValue)]
struct PostRow {
    record_id: String,
    tenant_id: String,
    title: String,
    slug: String,
    excerpt: String,
    content: String,
    featured_image: String,
    status: String,
    published_at: Option<DateTime<Utc>>,
    author_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PostRow {
    fn status(&self) -> Result<PostStatus, DbError> {
        self.status
            .parse()
            .map_err(|_| DbError::Encoding(format!("unknown post status: {}", self.status)))
    }

    fn try_into_post(self, categories: Vec<Category>) -> Result<Post, DbError> {
        let status = self.status()?;
        Ok(Post {
            id: parse_uuid(&self.record_id)?,
            tenant_id: self.tenant_id,
            title: self.title,
            slug: self.slug,
            excerpt: self.excerpt,
            content: self.content,
            featured_image: self.featured_image,
            status,
            published_at: self.published_at,
            author_id: self.author_id.as_deref().map(parse_uuid).transpose()?,
            categories,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// `RELATE` statements linking a post to each category.
fn relate_statements(post_id: &str, category_ids: &[Uuid]) -> String {
    category_ids
        .iter()
        .map(|cid| format!("RELATE post:`{post_id}` -> categorized_as -> category:`{cid}`;"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// SurrealDB implementation of the Post repository.
#[derive(Clone)]
pub struct SurrealPostRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPostRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn fetch_row(&self, tenant_id: &str, id: Uuid) -> QuireResult<PostRow> {
        let mut result = self
            .db
            .query(SELECT_POST)
            .bind(("id", id.to_string()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PostRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("post", id))?;
        Ok(row)
    }

    async fn categories_of(&self, post_id: &str) -> QuireResult<Vec<Category>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM category \
                 WHERE id IN (SELECT VALUE out FROM categorized_as \
                     WHERE in = type::record('post', $id)) \
                 ORDER BY name ASC",
            )
            .bind(("id", post_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CategoryRow> = result.take(0).map_err(DbError::from)?;
        let categories = rows
            .into_iter()
            .map(CategoryRow::try_into_category)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(categories)
    }

    async fn hydrate(&self, row: PostRow) -> QuireResult<Post> {
        let categories = self.categories_of(&row.record_id).await?;
        Ok(row.try_into_post(categories)?)
    }

    /// Deduplicate `ids` and check that each names a category in the tenant.
    async fn checked_categories(&self, tenant_id: &str, ids: &[Uuid]) -> QuireResult<Vec<Uuid>> {
        let categories = SurrealCategoryRepository::new(self.db.clone());
        let mut seen = HashSet::new();
        let mut checked = Vec::with_capacity(ids.len());
        for id in ids {
            if !seen.insert(*id) {
                continue;
            }
            match categories.get_by_id(tenant_id, *id).await {
                Ok(_) => checked.push(*id),
                Err(QuireError::NotFound { .. }) => {
                    return Err(QuireError::validation(format!("unknown category {id}")));
                }
                Err(e) => return Err(e),
            }
        }
        Ok(checked)
    }

    async fn ensure_slug_free(&self, slug: &str, exclude: Option<Uuid>) -> QuireResult<()> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM post \
                 WHERE slug = $slug AND meta::id(id) != $exclude GROUP ALL",
            )
            .bind(("slug", slug.to_string()))
            .bind((
                "exclude",
                exclude.map(|id| id.to_string()).unwrap_or_default(),
            ))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        if rows.first().map(|r| r.total).unwrap_or(0) > 0 {
            return Err(QuireError::conflict("post", "slug"));
        }
        Ok(())
    }
}

impl<C: Connection> PostRepository for SurrealPostRepository<C> {
    async fn create(&self, input: CreatePost) -> QuireResult<Post> {
        let title = required("title", &input.title)?;
        let slug = required("slug", &input.slug)?;
        let id = input.id.unwrap_or_else(Uuid::new_v4);
        if input.id.is_some() && record_exists(&self.db, "post", id).await? {
            return Err(QuireError::conflict("post", "id"));
        }
        self.ensure_slug_free(&slug, None).await?;
        let category_ids = self
            .checked_categories(&input.tenant_id, &input.category_ids)
            .await?;

        let id_str = id.to_string();
        let status = input.status.unwrap_or_default();
        let now = Utc::now();

        let query = format!(
            "BEGIN TRANSACTION; \
             CREATE type::record('post', $id) SET \
             tenant_id = $tenant_id, title = $title, slug = $slug, \
             excerpt = $excerpt, content = $content, \
             featured_image = $featured_image, status = $status, \
             published_at = $published_at, author_id = $author_id, \
             created_at = $now, updated_at = $now; \
             {} \
             COMMIT TRANSACTION;",
            relate_statements(&id_str, &category_ids)
        );

        self.db
            .query(&query)
            .bind(("id", id_str))
            .bind(("tenant_id", input.tenant_id.clone()))
            .bind(("title", title))
            .bind(("slug", slug))
            .bind(("excerpt", input.excerpt))
            .bind(("content", input.content))
            .bind(("featured_image", input.featured_image))
            .bind(("status", status.as_str().to_string()))
            .bind(("published_at", status.published_at(None, now)))
            .bind(("author_id", input.author_id.map(|a| a.to_string())))
            .bind(("now", now))
            .await
            .map_err(|e| SLUG.write_error(e))?
            .check()
            .map_err(|e| SLUG.write_error(e))?;

        debug!(post_id = %id, categories = category_ids.len(), "Post created");
        self.get_by_id(&input.tenant_id, id).await
    }

    async fn get_by_id(&self, tenant_id: &str, id: Uuid) -> QuireResult<Post> {
        let row = self.fetch_row(tenant_id, id).await?;
        self.hydrate(row).await
    }

    async fn get_published_by_slug(&self, tenant_id: &str, slug: &str) -> QuireResult<Post> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM post \
                 WHERE tenant_id = $tenant_id AND slug = $slug \
                 AND status = 'published' LIMIT 1",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("slug", slug.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PostRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("post", format!("slug={slug}")))?;
        self.hydrate(row).await
    }

    async fn update(&self, tenant_id: &str, id: Uuid, input: UpdatePost) -> QuireResult<Post> {
        let current = self.fetch_row(tenant_id, id).await?;
        let current_status = current.status()?;

        let mut sets = Vec::new();
        let title = input
            .title
            .as_deref()
            .map(|t| required("title", t))
            .transpose()?;
        if title.is_some() {
            sets.push("title = $title");
        }
        let slug = input
            .slug
            .as_deref()
            .map(|s| required("slug", s))
            .transpose()?;
        let slug_changed = slug.as_ref().is_some_and(|s| *s != current.slug);
        if let Some(ref slug) = slug {
            if slug_changed {
                self.ensure_slug_free(slug, Some(id)).await?;
            }
            sets.push("slug = $slug");
        }
        if input.excerpt.is_some() {
            sets.push("excerpt = $excerpt");
        }
        if input.content.is_some() {
            sets.push("content = $content");
        }
        if input.featured_image.is_some() {
            sets.push("featured_image = $featured_image");
        }
        sets.push("status = $status");
        sets.push("published_at = $published_at");
        sets.push("updated_at = $now");

        let id_str = id.to_string();
        let relink = match input.category_ids {
            Some(ref ids) => {
                let ids = self.checked_categories(tenant_id, ids).await?;
                format!(
                    "DELETE categorized_as WHERE in = post:`{id_str}`; {}",
                    relate_statements(&id_str, &ids)
                )
            }
            None => String::new(),
        };

        let query = format!(
            "BEGIN TRANSACTION; \
             UPDATE type::record('post', $id) SET {} \
             WHERE tenant_id = $tenant_id; \
             {relink} \
             COMMIT TRANSACTION;",
            sets.join(", ")
        );

        let status = input.status.unwrap_or(current_status);
        let now = Utc::now();

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str))
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("status", status.as_str().to_string()))
            .bind(("published_at", status.published_at(current.published_at, now)))
            .bind(("now", now));
        if let Some(title) = title {
            builder = builder.bind(("title", title));
        }
        if let Some(slug) = slug {
            builder = builder.bind(("slug", slug));
        }
        if let Some(excerpt) = input.excerpt {
            builder = builder.bind(("excerpt", excerpt));
        }
        if let Some(content) = input.content {
            builder = builder.bind(("content", content));
        }
        if let Some(featured_image) = input.featured_image {
            builder = builder.bind(("featured_image", featured_image));
        }

        let write_error = move |e: surrealdb::Error| -> QuireError {
            if slug_changed {
                SLUG.write_error(e)
            } else {
                DbError::query(e).into()
            }
        };
        builder
            .await
            .map_err(write_error)?
            .check()
            .map_err(write_error)?;

        self.get_by_id(tenant_id, id).await
    }

    async fn delete(&self, tenant_id: &str, id: Uuid) -> QuireResult<()> {
        self.fetch_row(tenant_id, id).await?;

        let id_str = id.to_string();
        let query = format!(
            "BEGIN TRANSACTION; \
             DELETE categorized_as WHERE in = post:`{id_str}`; \
             DELETE type::record('post', $id) WHERE tenant_id = $tenant_id; \
             COMMIT TRANSACTION;"
        );
        self.db
            .query(&query)
            .bind(("id", id_str))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::query)?;

        Ok(())
    }

    async fn list(
        &self,
        tenant_id: &str,
        options: PostListOptions,
    ) -> QuireResult<PaginatedResult<Post>> {
        let mut filters = vec!["tenant_id = $tenant_id"];
        if options.status.is_some() {
            filters.push("status = $status");
        }
        if options.category_id.is_some() {
            filters.push(
                "id IN (SELECT VALUE in FROM categorized_as \
                 WHERE out = type::record('category', $category_id))",
            );
        }
        let where_clause = filters.join(" AND ");

        let query = format!(
            "SELECT count() AS total FROM post WHERE {where_clause} GROUP ALL; \
             SELECT meta::id(id) AS record_id, * FROM post WHERE {where_clause} \
             ORDER BY created_at DESC {};",
            options.pagination.clause()
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("tenant_id", tenant_id.to_string()));
        if let Some(status) = options.status {
            builder = builder.bind(("status", status.as_str().to_string()));
        }
        if let Some(category_id) = options.category_id {
            builder = builder.bind(("category_id", category_id.to_string()));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let rows: Vec<PostRow> = result.take(1).map_err(DbError::from)?;
        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(self.hydrate(row).await?);
        }

        Ok(PaginatedResult::new(items, total, options.pagination))
    }
}

//! SurrealDB implementation of [`PageRepository`].
//!
//! Blocks are persisted as the serialized JSON string produced by the
//! block registry and handed back untouched, so a page read returns the
//! exact bytes that were written. Deletion is soft: `deleted_at` is set and
//! every read filters on it.
//!
//! Live pages also carry their slug in `live_slug`, which a UNIQUE index
//! covers per tenant. Soft deletion clears it, so a retired slug can be
//! reused while two live pages can never share one.

use chrono::{DateTime, Utc};
use quire_core::block::{self, Block};
use quire_core::error::{QuireError, QuireResult};
use quire_core::models::page::{CreatePage, Page, PageListOptions, PageStatus, UpdatePage};
use quire_core::repository::{PageRepository, PaginatedResult};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use super::{CountRow, UniqueIndex, parse_uuid, record_exists, required};
use crate::error::DbError;

const SELECT_PAGE: &str = "SELECT meta::id(id) AS record_id, * FROM type::record('page', $id) \
     WHERE tenant_id = $tenant_id AND deleted_at = NONE";

const LIVE_SLUG: UniqueIndex = UniqueIndex {
    entity: "page",
    name: "idx_page_live_slug",
    field: "slug",
};

#[derive(Debug, SurrealValue)]
struct PageRow {
    record_id: String,
    tenant_id: String,
    slug: String,
    title: String,
    status: String,
    blocks: String,
    meta: serde_json::Value,
    published_at: Option<DateTime<Utc>>,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PageRow {
    fn status(&self) -> Result<PageStatus, DbError> {
        self.status
            .parse()
            .map_err(|_| DbError::Encoding(format!("unknown page status: {}", self.status)))
    }

    fn try_into_page(self) -> Result<Page, DbError> {
        let status = self.status()?;
        Ok(Page {
            id: parse_uuid(&self.record_id)?,
            tenant_id: self.tenant_id,
            slug: self.slug,
            title: self.title,
            status,
            blocks: block::decode_blocks(&self.blocks)?,
            meta: self.meta,
            created_at: self.created_at,
            updated_at: self.updated_at,
            published_at: self.published_at,
            deleted_at: self.deleted_at,
        })
    }
}

/// `meta` must be a JSON object; absent means empty.
fn checked_meta(meta: Option<serde_json::Value>) -> QuireResult<serde_json::Value> {
    match meta {
        None | Some(serde_json::Value::Null) => {
            Ok(serde_json::Value::Object(serde_json::Map::new()))
        }
        Some(value @ serde_json::Value::Object(_)) => Ok(value),
        Some(_) => Err(QuireError::validation("meta must be a JSON object")),
    }
}

fn checked_blocks(blocks: &[Block]) -> QuireResult<String> {
    block::validate_block_ids(blocks)?;
    Ok(block::encode_blocks(blocks).map_err(DbError::from)?)
}

/// SurrealDB implementation of the Page repository.
#[derive(Clone)]
pub struct SurrealPageRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPageRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn fetch_row(&self, tenant_id: &str, id: Uuid) -> QuireResult<PageRow> {
        let mut result = self
            .db
            .query(SELECT_PAGE)
            .bind(("id", id.to_string()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PageRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("page", id))?;
        Ok(row)
    }

    /// Conflict if another live page in the tenant already uses `slug`.
    async fn ensure_slug_free(
        &self,
        tenant_id: &str,
        slug: &str,
        exclude: Option<Uuid>,
    ) -> QuireResult<()> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM page \
                 WHERE tenant_id = $tenant_id AND slug = $slug \
                 AND deleted_at = NONE AND meta::id(id) != $exclude \
                 GROUP ALL",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("slug", slug.to_string()))
            .bind((
                "exclude",
                exclude.map(|id| id.to_string()).unwrap_or_default(),
            ))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        if rows.first().map(|r| r.total).unwrap_or(0) > 0 {
            return Err(QuireError::conflict("page", "slug"));
        }
        Ok(())
    }

    /// Write the full mutable state of a page and read it back.
    async fn store(&self, tenant_id: &str, id: Uuid, row: PageWrite) -> QuireResult<Page> {
        let slug_changed = row.slug_changed;
        let write_error = move |e: surrealdb::Error| -> QuireError {
            if slug_changed {
                LIVE_SLUG.write_error(e)
            } else {
                DbError::query(e).into()
            }
        };
        let mut result = self
            .db
            .query(format!(
                "UPDATE type::record('page', $id) SET \
                 slug = $slug, live_slug = $slug, title = $title, status = $status, \
                 blocks = $blocks, meta = $meta, \
                 published_at = $published_at, updated_at = $now \
                 WHERE tenant_id = $tenant_id AND deleted_at = NONE; \
                 {SELECT_PAGE};"
            ))
            .bind(("id", id.to_string()))
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("slug", row.slug))
            .bind(("title", row.title))
            .bind(("status", row.status.as_str().to_string()))
            .bind(("blocks", row.blocks))
            .bind(("meta", row.meta))
            .bind(("published_at", row.published_at))
            .bind(("now", row.now))
            .await
            .map_err(write_error)?
            .check()
            .map_err(write_error)?;

        let rows: Vec<PageRow> = result.take(1).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("page", id))?;
        Ok(row.try_into_page()?)
    }
}

struct PageWrite {
    slug: String,
    slug_changed: bool,
    title: String,
    status: PageStatus,
    blocks: String,
    meta: serde_json::Value,
    published_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
}

impl<C: Connection> PageRepository for SurrealPageRepository<C> {
    async fn create(&self, input: CreatePage) -> QuireResult<Page> {
        let slug = required("slug", &input.slug)?;
        let title = required("title", &input.title)?;
        let meta = checked_meta(input.meta)?;
        let blocks = checked_blocks(&input.blocks)?;

        let id = input.id.unwrap_or_else(Uuid::new_v4);
        if input.id.is_some() && record_exists(&self.db, "page", id).await? {
            return Err(QuireError::conflict("page", "id"));
        }
        self.ensure_slug_free(&input.tenant_id, &slug, None).await?;

        let status = input.status.unwrap_or_default();
        let now = Utc::now();
        let published_at = status.published_at(None, now);

        let mut result = self
            .db
            .query(format!(
                "CREATE type::record('page', $id) SET \
                 tenant_id = $tenant_id, slug = $slug, live_slug = $slug, \
                 title = $title, \
                 status = $status, blocks = $blocks, meta = $meta, \
                 published_at = $published_at, \
                 created_at = $now, updated_at = $now; \
                 {SELECT_PAGE};"
            ))
            .bind(("id", id.to_string()))
            .bind(("tenant_id", input.tenant_id.clone()))
            .bind(("slug", slug))
            .bind(("title", title))
            .bind(("status", status.as_str().to_string()))
            .bind(("blocks", blocks))
            .bind(("meta", meta))
            .bind(("published_at", published_at))
            .bind(("now", now))
            .await
            .map_err(|e| LIVE_SLUG.write_error(e))?
            .check()
            .map_err(|e| LIVE_SLUG.write_error(e))?;

        let rows: Vec<PageRow> = result.take(1).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("page", id))?;

        debug!(page_id = %id, tenant_id = %input.tenant_id, "Page created");
        Ok(row.try_into_page()?)
    }

    async fn get_by_id(&self, tenant_id: &str, id: Uuid) -> QuireResult<Page> {
        Ok(self.fetch_row(tenant_id, id).await?.try_into_page()?)
    }

    async fn get_by_slug(&self, tenant_id: &str, slug: &str) -> QuireResult<Page> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM page \
                 WHERE tenant_id = $tenant_id AND slug = $slug \
                 AND deleted_at = NONE LIMIT 1",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("slug", slug.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PageRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("page", format!("slug={slug}")))?;
        Ok(row.try_into_page()?)
    }

    async fn update(&self, tenant_id: &str, id: Uuid, input: UpdatePage) -> QuireResult<Page> {
        let current = self.fetch_row(tenant_id, id).await?;
        let current_status = current.status()?;

        let (slug, slug_changed) = match input.slug {
            Some(slug) => {
                let slug = required("slug", &slug)?;
                let changed = slug != current.slug;
                if changed {
                    self.ensure_slug_free(tenant_id, &slug, Some(id)).await?;
                }
                (slug, changed)
            }
            None => (current.slug, false),
        };
        let title = match input.title {
            Some(title) => required("title", &title)?,
            None => current.title,
        };
        let blocks = match input.blocks {
            Some(blocks) => checked_blocks(&blocks)?,
            None => current.blocks,
        };
        let meta = match input.meta {
            Some(meta) => checked_meta(Some(meta))?,
            None => current.meta,
        };

        let status = input.status.unwrap_or(current_status);
        let now = Utc::now();
        let published_at = status.published_at(current.published_at, now);

        let page = self
            .store(
                tenant_id,
                id,
                PageWrite {
                    slug,
                    slug_changed,
                    title,
                    status,
                    blocks,
                    meta,
                    published_at,
                    now,
                },
            )
            .await?;

        if status != current_status {
            debug!(page_id = %id, from = %current_status, to = %status, "Page status changed");
        }
        Ok(page)
    }

    async fn delete(&self, tenant_id: &str, id: Uuid) -> QuireResult<()> {
        self.fetch_row(tenant_id, id).await?;

        self.db
            .query(
                "UPDATE type::record('page', $id) SET live_slug = NONE, \
                 deleted_at = time::now(), updated_at = time::now() \
                 WHERE tenant_id = $tenant_id",
            )
            .bind(("id", id.to_string()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::query)?;

        debug!(page_id = %id, "Page soft-deleted");
        Ok(())
    }

    async fn list(
        &self,
        tenant_id: &str,
        options: PageListOptions,
    ) -> QuireResult<PaginatedResult<Page>> {
        let mut filters = vec!["tenant_id = $tenant_id", "deleted_at = NONE"];
        if options.status.is_some() {
            filters.push("status = $status");
        }
        let search = options
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        if search.is_some() {
            filters.push(
                "(string::lowercase(title) CONTAINS $search \
                 OR string::lowercase(slug) CONTAINS $search)",
            );
        }
        let where_clause = filters.join(" AND ");

        let query = format!(
            "SELECT count() AS total FROM page WHERE {where_clause} GROUP ALL; \
             SELECT meta::id(id) AS record_id, * FROM page WHERE {where_clause} \
             ORDER BY updated_at DESC {};",
            options.pagination.clause()
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("tenant_id", tenant_id.to_string()));
        if let Some(status) = options.status {
            builder = builder.bind(("status", status.as_str().to_string()));
        }
        if let Some(search) = search {
            builder = builder.bind(("search", search));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let rows: Vec<PageRow> = result.take(1).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(PageRow::try_into_page)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult::new(items, total, options.pagination))
    }

    async fn publish(&self, tenant_id: &str, id: Uuid) -> QuireResult<Page> {
        self.update(
            tenant_id,
            id,
            UpdatePage {
                status: Some(PageStatus::Published),
                ..Default::default()
            },
        )
        .await
    }

    async fn unpublish(&self, tenant_id: &str, id: Uuid) -> QuireResult<Page> {
        self.update(
            tenant_id,
            id,
            UpdatePage {
                status: Some(PageStatus::Draft),
                ..Default::default()
            },
        )
        .await
    }
}

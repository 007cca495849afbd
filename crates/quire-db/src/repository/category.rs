//! SurrealDB implementation of [`CategoryRepository`].

use chrono::{DateTime, Utc};
use quire_core::error::{QuireError, QuireResult};
use quire_core::models::category::{Category, CreateCategory, UpdateCategory};
use quire_core::repository::{CategoryRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, UniqueIndex, parse_uuid, record_exists, required};
use crate::error::DbError;

const SELECT_CATEGORY: &str = "SELECT meta::id(id) AS record_id, * \
     FROM type::record('category', $id) WHERE tenant_id = $tenant_id";

const SLUG: UniqueIndex = UniqueIndex {
    entity: "category",
    name: "idx_category_slug",
    field: "slug",
};

#[derive(Debug, SurrealValue)]
pub(crate) struct CategoryRow {
    record_id: String,
    tenant_id: String,
    name: String,
    slug: String,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CategoryRow {
    pub(crate) fn try_into_category(self) -> Result<Category, DbError> {
        Ok(Category {
            id: parse_uuid(&self.record_id)?,
            tenant_id: self.tenant_id,
            name: self.name,
            slug: self.slug,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Category repository.
#[derive(Clone)]
pub struct SurrealCategoryRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCategoryRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Slugs are unique across the whole store, not per tenant.
    async fn ensure_slug_free(&self, slug: &str, exclude: Option<Uuid>) -> QuireResult<()> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM category \
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
            return Err(QuireError::conflict("category", "slug"));
        }
        Ok(())
    }
}

impl<C: Connection> CategoryRepository for SurrealCategoryRepository<C> {
    async fn create(&self, input: CreateCategory) -> QuireResult<Category> {
        let name = required("name", &input.name)?;
        let slug = required("slug", &input.slug)?;
        let id = input.id.unwrap_or_else(Uuid::new_v4);
        if input.id.is_some() && record_exists(&self.db, "category", id).await? {
            return Err(QuireError::conflict("category", "id"));
        }
        self.ensure_slug_free(&slug, None).await?;

        let mut result = self
            .db
            .query(format!(
                "CREATE type::record('category', $id) SET \
                 tenant_id = $tenant_id, name = $name, slug = $slug, \
                 description = $description; \
                 {SELECT_CATEGORY};"
            ))
            .bind(("id", id.to_string()))
            .bind(("tenant_id", input.tenant_id))
            .bind(("name", name))
            .bind(("slug", slug))
            .bind(("description", input.description))
            .await
            .map_err(|e| SLUG.write_error(e))?
            .check()
            .map_err(|e| SLUG.write_error(e))?;

        let rows: Vec<CategoryRow> = result.take(1).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("category", id))?;
        Ok(row.try_into_category()?)
    }

    async fn get_by_id(&self, tenant_id: &str, id: Uuid) -> QuireResult<Category> {
        let mut result = self
            .db
            .query(SELECT_CATEGORY)
            .bind(("id", id.to_string()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CategoryRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("category", id))?;
        Ok(row.try_into_category()?)
    }

    async fn get_by_slug(&self, tenant_id: &str, slug: &str) -> QuireResult<Category> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM category \
                 WHERE tenant_id = $tenant_id AND slug = $slug LIMIT 1",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("slug", slug.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CategoryRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("category", format!("slug={slug}")))?;
        Ok(row.try_into_category()?)
    }

    async fn update(
        &self,
        tenant_id: &str,
        id: Uuid,
        input: UpdateCategory,
    ) -> QuireResult<Category> {
        let current = self.get_by_id(tenant_id, id).await?;

        let mut sets = Vec::new();
        let name = input.name.as_deref().map(|n| required("name", n)).transpose()?;
        if name.is_some() {
            sets.push("name = $name");
        }
        let slug = input.slug.as_deref().map(|s| required("slug", s)).transpose()?;
        let slug_changed = slug.as_ref().is_some_and(|s| *s != current.slug);
        if let Some(ref slug) = slug {
            if slug_changed {
                self.ensure_slug_free(slug, Some(id)).await?;
            }
            sets.push("slug = $slug");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('category', $id) SET {} \
             WHERE tenant_id = $tenant_id; {SELECT_CATEGORY};",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id.to_string()))
            .bind(("tenant_id", tenant_id.to_string()));
        if let Some(name) = name {
            builder = builder.bind(("name", name));
        }
        if let Some(slug) = slug {
            builder = builder.bind(("slug", slug));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }

        let write_error = move |e: surrealdb::Error| -> QuireError {
            if slug_changed {
                SLUG.write_error(e)
            } else {
                DbError::query(e).into()
            }
        };
        let mut result = builder
            .await
            .map_err(write_error)?
            .check()
            .map_err(write_error)?;

        let rows: Vec<CategoryRow> = result.take(1).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("category", id))?;
        Ok(row.try_into_category()?)
    }

    async fn delete(&self, tenant_id: &str, id: Uuid) -> QuireResult<()> {
        self.get_by_id(tenant_id, id).await?;

        let id_str = id.to_string();
        let query = format!(
            "BEGIN TRANSACTION; \
             DELETE categorized_as WHERE out = category:`{id_str}`; \
             DELETE type::record('category', $id) WHERE tenant_id = $tenant_id; \
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
        pagination: Pagination,
    ) -> QuireResult<PaginatedResult<Category>> {
        let query = format!(
            "SELECT count() AS total FROM category \
             WHERE tenant_id = $tenant_id GROUP ALL; \
             SELECT meta::id(id) AS record_id, * FROM category \
             WHERE tenant_id = $tenant_id ORDER BY name ASC {};",
            pagination.clause()
        );

        let mut result = self
            .db
            .query(&query)
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let count_rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let rows: Vec<CategoryRow> = result.take(1).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(CategoryRow::try_into_category)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult::new(items, total, pagination))
    }
}

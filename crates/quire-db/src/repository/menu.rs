//! SurrealDB implementation of [`MenuRepository`].
//!
//! Menu items are stored as one serialized JSON string; nesting is not
//! inspected by the database.

use chrono::{DateTime, Utc};
use quire_core::error::{QuireError, QuireResult};
use quire_core::models::menu::{CreateMenu, Menu, MenuItem, UpdateMenu};
use quire_core::repository::{MenuRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, create_error, parse_uuid, record_exists, required};
use crate::error::DbError;

const SELECT_MENU: &str = "SELECT meta::id(id) AS record_id, * \
     FROM type::record('menu', $id) WHERE tenant_id = $tenant_id";

#[derive(Debug, SurrealValue)]
struct MenuRow {
    record_id: String,
    tenant_id: String,
    name: String,
    description: String,
    items: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MenuRow {
    fn try_into_menu(self) -> Result<Menu, DbError> {
        let items = if self.items.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(&self.items)
                .map_err(|e| DbError::Encoding(format!("menu items: {e}")))?
        };
        Ok(Menu {
            id: parse_uuid(&self.record_id)?,
            tenant_id: self.tenant_id,
            name: self.name,
            description: self.description,
            items,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn encode_items(items: &[MenuItem]) -> Result<String, DbError> {
    serde_json::to_string(items).map_err(|e| DbError::Encoding(format!("menu items: {e}")))
}

/// SurrealDB implementation of the Menu repository.
#[derive(Clone)]
pub struct SurrealMenuRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealMenuRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> MenuRepository for SurrealMenuRepository<C> {
    async fn create(&self, input: CreateMenu) -> QuireResult<Menu> {
        let name = required("name", &input.name)?;
        let items = encode_items(&input.items)?;

        let id = input.id.unwrap_or_else(Uuid::new_v4);
        if input.id.is_some() && record_exists(&self.db, "menu", id).await? {
            return Err(QuireError::conflict("menu", "id"));
        }
        let mut result = self
            .db
            .query(format!(
                "CREATE type::record('menu', $id) SET \
                 tenant_id = $tenant_id, name = $name, \
                 description = $description, items = $items; \
                 {SELECT_MENU};"
            ))
            .bind(("id", id.to_string()))
            .bind(("tenant_id", input.tenant_id))
            .bind(("name", name))
            .bind(("description", input.description))
            .bind(("items", items))
            .await
            .map_err(|e| create_error("menu", e))?
            .check()
            .map_err(|e| create_error("menu", e))?;

        let rows: Vec<MenuRow> = result.take(1).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("menu", id))?;
        Ok(row.try_into_menu()?)
    }

    async fn get_by_id(&self, tenant_id: &str, id: Uuid) -> QuireResult<Menu> {
        let mut result = self
            .db
            .query(SELECT_MENU)
            .bind(("id", id.to_string()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MenuRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("menu", id))?;
        Ok(row.try_into_menu()?)
    }

    async fn update(&self, tenant_id: &str, id: Uuid, input: UpdateMenu) -> QuireResult<Menu> {
        self.get_by_id(tenant_id, id).await?;

        let mut sets = Vec::new();
        let name = input.name.as_deref().map(|n| required("name", n)).transpose()?;
        if name.is_some() {
            sets.push("name = $name");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        let items = input.items.as_deref().map(encode_items).transpose()?;
        if items.is_some() {
            sets.push("items = $items");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('menu', $id) SET {} \
             WHERE tenant_id = $tenant_id; {SELECT_MENU};",
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
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(items) = items {
            builder = builder.bind(("items", items));
        }

        let mut result = builder
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::query)?;

        let rows: Vec<MenuRow> = result.take(1).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("menu", id))?;
        Ok(row.try_into_menu()?)
    }

    async fn delete(&self, tenant_id: &str, id: Uuid) -> QuireResult<()> {
        self.get_by_id(tenant_id, id).await?;

        self.db
            .query("DELETE type::record('menu', $id) WHERE tenant_id = $tenant_id")
            .bind(("id", id.to_string()))
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
    ) -> QuireResult<PaginatedResult<Menu>> {
        let query = format!(
            "SELECT count() AS total FROM menu \
             WHERE tenant_id = $tenant_id GROUP ALL; \
             SELECT meta::id(id) AS record_id, * FROM menu \
             WHERE tenant_id = $tenant_id ORDER BY created_at DESC {};",
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

        let rows: Vec<MenuRow> = result.take(1).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(MenuRow::try_into_menu)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult::new(items, total, pagination))
    }
}

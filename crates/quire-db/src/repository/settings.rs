//! SurrealDB implementation of [`SettingsRepository`].
//!
//! Settings live in `system_config` as a JSON document per
//! `(tenant_id, key)`.
//! The row is created on the first write.

use quire_core::error::QuireResult;
use quire_core::models::settings::{GLOBAL_SETTINGS_KEY, GlobalSettings};
use quire_core::repository::SettingsRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ConfigRow {
    document: serde_json::Value,
}

/// SurrealDB implementation of the Settings repository.
#[derive(Clone)]
pub struct SurrealSettingsRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSettingsRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn get_value(
        &self,
        tenant_id: &str,
        key: &str,
    ) -> Result<Option<serde_json::Value>, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT document FROM system_config \
                 WHERE tenant_id = $tenant_id AND key = $key LIMIT 1",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("key", key.to_string()))
            .await?;

        let rows: Vec<ConfigRow> = result.take(0)?;
        Ok(rows.into_iter().next().map(|r| r.document))
    }

    async fn put_value(
        &self,
        tenant_id: &str,
        key: &str,
        value: serde_json::Value,
    ) -> Result<(), DbError> {
        let exists = self.get_value(tenant_id, key).await?.is_some();
        let query = if exists {
            "UPDATE system_config SET document = $document, updated_at = time::now() \
             WHERE tenant_id = $tenant_id AND key = $key"
        } else {
            "CREATE system_config SET tenant_id = $tenant_id, key = $key, \
             document = $document"
        };

        self.db
            .query(query)
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("key", key.to_string()))
            .bind(("document", value))
            .await?
            .check()
            .map_err(DbError::query)?;
        Ok(())
    }
}

impl<C: Connection> SettingsRepository for SurrealSettingsRepository<C> {
    async fn get_global_settings(&self, tenant_id: &str) -> QuireResult<GlobalSettings> {
        match self.get_value(tenant_id, GLOBAL_SETTINGS_KEY).await? {
            Some(value) => Ok(serde_json::from_value(value)
                .map_err(|e| DbError::Encoding(format!("global settings: {e}")))?),
            None => Ok(GlobalSettings::default()),
        }
    }

    async fn update_global_settings(
        &self,
        tenant_id: &str,
        settings: GlobalSettings,
    ) -> QuireResult<GlobalSettings> {
        let value = serde_json::to_value(&settings)
            .map_err(|e| DbError::Encoding(format!("global settings: {e}")))?;
        self.put_value(tenant_id, GLOBAL_SETTINGS_KEY, value).await?;
        self.get_global_settings(tenant_id).await
    }
}

//! Schema definitions and migration runner for SurrealDB.
//!
//! Tables are SCHEMAFULL. UUIDs are stored as strings, statuses and roles
//! as lowercase strings guarded by ASSERT constraints. Block sequences and
//! menu items are stored as opaque JSON strings so they round-trip byte for
//! byte.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "content_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Pages (soft-deleted via deleted_at, which also clears live_slug)
-- =======================================================================
DEFINE TABLE IF NOT EXISTS page SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS tenant_id ON TABLE page TYPE string;
DEFINE FIELD IF NOT EXISTS slug ON TABLE page TYPE string;
DEFINE FIELD IF NOT EXISTS live_slug ON TABLE page TYPE option<string>;
DEFINE FIELD IF NOT EXISTS title ON TABLE page TYPE string;
DEFINE FIELD IF NOT EXISTS status ON TABLE page TYPE string \
    ASSERT $value IN ['draft', 'published', 'archived'];
DEFINE FIELD IF NOT EXISTS blocks ON TABLE page TYPE string DEFAULT '[]';
DEFINE FIELD IF NOT EXISTS meta ON TABLE page TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD IF NOT EXISTS published_at ON TABLE page TYPE option<datetime>;
DEFINE FIELD IF NOT EXISTS deleted_at ON TABLE page TYPE option<datetime>;
DEFINE FIELD IF NOT EXISTS created_at ON TABLE page TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD IF NOT EXISTS updated_at ON TABLE page TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_page_tenant_slug ON TABLE page COLUMNS tenant_id, slug;
DEFINE INDEX IF NOT EXISTS idx_page_live_slug ON TABLE page \
    COLUMNS tenant_id, live_slug UNIQUE;
DEFINE INDEX IF NOT EXISTS idx_page_tenant_status ON TABLE page \
    COLUMNS tenant_id, status;

-- =======================================================================
-- Menus
-- =======================================================================
DEFINE TABLE IF NOT EXISTS menu SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS tenant_id ON TABLE menu TYPE string;
DEFINE FIELD IF NOT EXISTS name ON TABLE menu TYPE string;
DEFINE FIELD IF NOT EXISTS description ON TABLE menu TYPE string DEFAULT '';
DEFINE FIELD IF NOT EXISTS items ON TABLE menu TYPE string DEFAULT '[]';
DEFINE FIELD IF NOT EXISTS created_at ON TABLE menu TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD IF NOT EXISTS updated_at ON TABLE menu TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_menu_tenant ON TABLE menu COLUMNS tenant_id;

-- =======================================================================
-- Categories
-- =======================================================================
DEFINE TABLE IF NOT EXISTS category SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS tenant_id ON TABLE category TYPE string;
DEFINE FIELD IF NOT EXISTS name ON TABLE category TYPE string;
DEFINE FIELD IF NOT EXISTS slug ON TABLE category TYPE string;
DEFINE FIELD IF NOT EXISTS description ON TABLE category TYPE string DEFAULT '';
DEFINE FIELD IF NOT EXISTS created_at ON TABLE category TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD IF NOT EXISTS updated_at ON TABLE category TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_category_slug ON TABLE category COLUMNS slug UNIQUE;

-- =======================================================================
-- Posts
-- =======================================================================
DEFINE TABLE IF NOT EXISTS post SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS tenant_id ON TABLE post TYPE string;
DEFINE FIELD IF NOT EXISTS title ON TABLE post TYPE string;
DEFINE FIELD IF NOT EXISTS slug ON TABLE post TYPE string;
DEFINE FIELD IF NOT EXISTS excerpt ON TABLE post TYPE string DEFAULT '';
DEFINE FIELD IF NOT EXISTS content ON TABLE post TYPE string DEFAULT '';
DEFINE FIELD IF NOT EXISTS featured_image ON TABLE post TYPE string DEFAULT '';
DEFINE FIELD IF NOT EXISTS status ON TABLE post TYPE string \
    ASSERT $value IN ['draft', 'published', 'archived'];
DEFINE FIELD IF NOT EXISTS published_at ON TABLE post TYPE option<datetime>;
DEFINE FIELD IF NOT EXISTS author_id ON TABLE post TYPE option<string>;
DEFINE FIELD IF NOT EXISTS created_at ON TABLE post TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD IF NOT EXISTS updated_at ON TABLE post TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_post_slug ON TABLE post COLUMNS slug UNIQUE;
DEFINE INDEX IF NOT EXISTS idx_post_tenant_status ON TABLE post \
    COLUMNS tenant_id, status;

-- =======================================================================
-- Users (one set per storage handle)
-- =======================================================================
DEFINE TABLE IF NOT EXISTS user SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS name ON TABLE user TYPE string;
DEFINE FIELD IF NOT EXISTS email ON TABLE user TYPE string;
DEFINE FIELD IF NOT EXISTS password_hash ON TABLE user TYPE string;
DEFINE FIELD IF NOT EXISTS role ON TABLE user TYPE string \
    ASSERT $value IN ['admin', 'editor'];
DEFINE FIELD IF NOT EXISTS created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD IF NOT EXISTS updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_user_email ON TABLE user COLUMNS email UNIQUE;

-- =======================================================================
-- System configuration (key/value documents per tenant)
-- =======================================================================
DEFINE TABLE IF NOT EXISTS system_config SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS tenant_id ON TABLE system_config TYPE string;
DEFINE FIELD IF NOT EXISTS key ON TABLE system_config TYPE string;
DEFINE FIELD IF NOT EXISTS document ON TABLE system_config TYPE object FLEXIBLE \
    DEFAULT {};
DEFINE FIELD IF NOT EXISTS created_at ON TABLE system_config TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD IF NOT EXISTS updated_at ON TABLE system_config TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_system_config_key ON TABLE system_config \
    COLUMNS tenant_id, key UNIQUE;

-- =======================================================================
-- Graph Edge Tables (relations)
-- =======================================================================

-- Post -> Category membership
DEFINE TABLE IF NOT EXISTS categorized_as TYPE RELATION SCHEMAFULL;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending schema migrations.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT version FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS
        .iter()
        .filter(|m| m.version > current_version)
    {
        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );
        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!(
                "migration v{} '{}' failed: {e}",
                migration.version, migration.name,
            ))
        })?;

        db.query("CREATE _migration SET version = $version, name = $name")
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "failed to record migration v{}: {e}",
                    migration.version,
                ))
            })?;
    }

    Ok(())
}

/// Latest schema version known to this build.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map(|m| m.version).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(window[0].version < window[1].version);
        }
        assert_eq!(latest_version(), 1);
    }

    #[test]
    fn schema_defines_every_table() {
        for table in [
            "page",
            "menu",
            "category",
            "post",
            "user",
            "system_config",
            "categorized_as",
        ] {
            assert!(
                SCHEMA_V1.contains(&format!("DEFINE TABLE IF NOT EXISTS {table} ")),
                "missing table {table}"
            );
        }
    }

    #[tokio::test]
    async fn schema_can_be_applied_over_itself() {
        let db = Surreal::new::<surrealdb::engine::local::Mem>(())
            .await
            .unwrap();
        db.use_ns("test").use_db("test").await.unwrap();

        db.query(SCHEMA_V1).await.unwrap().check().unwrap();
        db.query(SCHEMA_V1).await.unwrap().check().unwrap();
    }
}

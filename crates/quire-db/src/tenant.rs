//! Tenant Resolver: maps a tenant id to the storage handle that request
//! should use.
//!
//! In single-tenant mode every request shares one handle and the tenant id
//! is always empty. In multi-tenant mode each tenant gets its own database
//! (`tenant_<id>` inside the configured namespace), opened on first use,
//! migrated, seeded and then cached for the life of the process. Requests
//! racing to open the same tenant share a single open.

use std::sync::Arc;

use dashmap::DashMap;
use quire_core::error::{QuireError, QuireResult};
use quire_core::tenant::{TenancyMode, validate_tenant_id};
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::bootstrap::{AdminSeed, seed_admin};
use crate::connection::{DbConfig, DbManager};
use crate::schema::run_migrations;

/// The `(tenant id, storage handle)` pair a request operates in.
#[derive(Clone)]
pub struct TenantScope {
    pub tenant_id: String,
    pub db: Surreal<Any>,
}

impl std::fmt::Debug for TenantScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantScope")
            .field("tenant_id", &self.tenant_id)
            .finish_non_exhaustive()
    }
}

/// What every freshly opened database is prepared with.
#[derive(Debug, Clone, Default)]
pub struct Provisioning {
    /// Administrator created in an empty user table. `None` skips seeding.
    pub admin: Option<AdminSeed>,
    pub pepper: Option<String>,
}

pub struct TenantResolver {
    mode: TenancyMode,
    config: DbConfig,
    provisioning: Provisioning,
    shared: Surreal<Any>,
    tenants: DashMap<String, Arc<OnceCell<Surreal<Any>>>>,
}

impl TenantResolver {
    /// Connect the shared handle and prepare it.
    pub async fn connect(
        mode: TenancyMode,
        config: DbConfig,
        provisioning: Provisioning,
    ) -> QuireResult<Arc<Self>> {
        let shared = DbManager::connect(&config).await?.into_client();
        prepare(&shared, &provisioning).await?;
        Ok(Arc::new(Self::with_shared(mode, config, provisioning, shared)))
    }

    /// Build around an already prepared shared handle.
    pub fn with_shared(
        mode: TenancyMode,
        config: DbConfig,
        provisioning: Provisioning,
        shared: Surreal<Any>,
    ) -> Self {
        Self {
            mode,
            config,
            provisioning,
            shared,
            tenants: DashMap::new(),
        }
    }

    pub fn mode(&self) -> TenancyMode {
        self.mode
    }

    /// Scope used when no tenant has been resolved for a request.
    pub fn default_scope(&self) -> TenantScope {
        TenantScope {
            tenant_id: String::new(),
            db: self.shared.clone(),
        }
    }

    /// Number of tenant databases opened so far.
    pub fn open_tenants(&self) -> usize {
        self.tenants
            .iter()
            .filter(|entry| entry.value().initialized())
            .count()
    }

    /// Scope for `tenant_id`.
    ///
    /// Single-tenant mode ignores the id. Multi-tenant mode rejects ids
    /// that are not valid database name fragments and reports any failure
    /// to open the tenant's database as an internal error.
    pub async fn scope_for(&self, tenant_id: &str) -> QuireResult<TenantScope> {
        if !self.mode.is_multi() {
            return Ok(self.default_scope());
        }
        validate_tenant_id(tenant_id)?;

        // Clone the cell out so no map guard is held across the open.
        let cell = self
            .tenants
            .entry(tenant_id.to_string())
            .or_default()
            .value()
            .clone();

        // A failed open leaves the cell empty; the next request retries.
        let db = cell
            .get_or_try_init(|| self.open(tenant_id))
            .await
            .map_err(|e| {
                error!(tenant_id, error = %e, "Failed to open tenant database");
                QuireError::Internal(format!("tenant database unavailable: {tenant_id}"))
            })?
            .clone();

        Ok(TenantScope {
            tenant_id: tenant_id.to_string(),
            db,
        })
    }

    async fn open(&self, tenant_id: &str) -> QuireResult<Surreal<Any>> {
        let database = format!("tenant_{tenant_id}");
        let db = DbManager::connect_database(&self.config, &database)
            .await?
            .into_client();
        prepare(&db, &self.provisioning).await?;
        info!(tenant_id, database = %database, "Opened tenant database");
        Ok(db)
    }
}

async fn prepare(db: &Surreal<Any>, provisioning: &Provisioning) -> QuireResult<()> {
    run_migrations(db).await?;
    if let Some(seed) = &provisioning.admin {
        seed_admin(db, seed, provisioning.pepper.as_deref()).await?;
    }
    Ok(())
}

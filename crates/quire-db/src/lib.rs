//! Quire Database: SurrealDB connection management, schema migrations,
//! repository implementations and tenant-scoped handle resolution.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Repositories for every `quire-core` repository trait
//! - The [`TenantResolver`] that picks a storage handle per request
//! - First-run administrator seeding ([`seed_admin`])

mod bootstrap;
mod connection;
mod error;
pub mod repository;
mod schema;
mod tenant;

pub use bootstrap::{AdminSeed, seed_admin};
pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use schema::{latest_version, run_migrations};
pub use tenant::{Provisioning, TenantResolver, TenantScope};

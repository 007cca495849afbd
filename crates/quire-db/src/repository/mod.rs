//! SurrealDB repository implementations.

mod category;
mod menu;
mod page;
mod post;
mod settings;
mod stats;
mod user;

pub use category::SurrealCategoryRepository;
pub use menu::SurrealMenuRepository;
pub use page::SurrealPageRepository;
pub use post::SurrealPostRepository;
pub use settings::SurrealSettingsRepository;
pub use stats::SurrealStatsRepository;
pub use user::{SurrealUserRepository, hash_password};

use quire_core::error::QuireError;
use surrealdb::{Connection, Surreal};
use surrealdb_types::{QueryError, SurrealValue};
use uuid::Uuid;

use crate::error::DbError;

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
pub(crate) struct CountRow {
    pub(crate) total: u64,
}

pub(crate) fn parse_uuid(raw: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::Encoding(format!("invalid UUID '{raw}': {e}")))
}

/// Trimmed value of a required text field, or a validation error naming it.
pub(crate) fn required(field: &str, value: &str) -> quire_core::QuireResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(QuireError::validation(format!(
            "{field} is required"
        )));
    }
    Ok(trimmed.to_string())
}

/// A UNIQUE index a write statement claims a value in.
pub(crate) struct UniqueIndex {
    pub(crate) entity: &'static str,
    pub(crate) name: &'static str,
    pub(crate) field: &'static str,
}

impl UniqueIndex {
    /// Error for a failed write that claims a value in this index.
    ///
    /// A value already held by the index, or a commit lost to a concurrent
    /// transaction claiming it, is a conflict on `field`.
    pub(crate) fn write_error(&self, err: surrealdb::Error) -> QuireError {
        let message = err.message();
        let taken = message.contains(self.name) && message.contains("already contains");
        let lost_race = err.query_details() == Some(&QueryError::TransactionConflict);
        if taken || lost_race {
            return QuireError::conflict(self.entity, self.field);
        }
        create_error(self.entity, err)
    }
}

/// Error for a failed `CREATE`: a record id that already exists is a
/// conflict on `id`.
pub(crate) fn create_error(entity: &str, err: surrealdb::Error) -> QuireError {
    if err.is_already_exists() {
        return QuireError::conflict(entity, "id");
    }
    DbError::query(err).into()
}

/// Whether a record with `id` exists in `table`, in any tenant.
pub(crate) async fn record_exists<C: Connection>(
    db: &Surreal<C>,
    table: &str,
    id: Uuid,
) -> quire_core::QuireResult<bool> {
    let mut result = db
        .query("SELECT count() AS total FROM type::record($table, $id) GROUP ALL")
        .bind(("table", table.to_string()))
        .bind(("id", id.to_string()))
        .await
        .map_err(DbError::from)?;
    let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
    Ok(rows.first().map(|r| r.total).unwrap_or(0) > 0)
}

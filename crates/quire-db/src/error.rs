//! Database-specific error types and conversions.

use quire_core::block::BlockError;
use quire_core::error::QuireError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Stored value cannot be decoded: {0}")]
    Encoding(String),
}

impl DbError {
    pub(crate) fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub(crate) fn query(err: impl ToString) -> Self {
        Self::Query(err.to_string())
    }
}

impl From<BlockError> for DbError {
    fn from(err: BlockError) -> Self {
        DbError::Encoding(err.to_string())
    }
}

impl From<DbError> for QuireError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => QuireError::NotFound { entity, id },
            other => QuireError::Database(other.to_string()),
        }
    }
}

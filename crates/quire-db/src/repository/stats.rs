//! Dashboard counters.

use quire_core::error::QuireResult;
use quire_core::models::settings::ContentStats;
use quire_core::repository::StatsRepository;
use surrealdb::{Connection, Surreal};

use super::CountRow;
use crate::error::DbError;

/// SurrealDB implementation of the Stats repository.
#[derive(Clone)]
pub struct SurrealStatsRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealStatsRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> StatsRepository for SurrealStatsRepository<C> {
    async fn content_stats(&self, tenant_id: &str) -> QuireResult<ContentStats> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM page \
                 WHERE tenant_id = $tenant_id AND deleted_at = NONE GROUP ALL; \
                 SELECT count() AS total FROM post \
                 WHERE tenant_id = $tenant_id GROUP ALL; \
                 SELECT count() AS total FROM category \
                 WHERE tenant_id = $tenant_id GROUP ALL; \
                 SELECT count() AS total FROM user GROUP ALL;",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut counts = [0u64; 4];
        for (index, count) in counts.iter_mut().enumerate() {
            let rows: Vec<CountRow> = result.take(index).map_err(DbError::from)?;
            *count = rows.first().map(|r| r.total).unwrap_or(0);
        }
        let [pages, posts, categories, users] = counts;

        Ok(ContentStats {
            pages,
            posts,
            categories,
            users,
        })
    }
}

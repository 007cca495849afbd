use axum::Json;
use quire_core::models::settings::ContentStats;
use quire_core::repository::StatsRepository;
use quire_db::repository::SurrealStatsRepository;

use crate::api::error::ApiResult;
use crate::api::extract::Tenant;

pub(crate) async fn stats(tenant: Tenant) -> ApiResult<Json<ContentStats>> {
    let repo = SurrealStatsRepository::new(tenant.0.db.clone());
    Ok(Json(repo.content_stats(tenant.id()).await?))
}

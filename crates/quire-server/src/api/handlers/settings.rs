use axum::Json;
use quire_core::models::settings::GlobalSettings;
use quire_core::repository::SettingsRepository;
use quire_db::repository::SurrealSettingsRepository;
use tracing::info;

use crate::api::error::ApiResult;
use crate::api::extract::{ApiJson, AuthUser, Tenant};

/// Current settings, or the defaults if none were saved. Served both to
/// the admin UI and publicly.
pub(crate) async fn get(tenant: Tenant) -> ApiResult<Json<GlobalSettings>> {
    let repo = SurrealSettingsRepository::new(tenant.0.db.clone());
    Ok(Json(repo.get_global_settings(tenant.id()).await?))
}

pub(crate) async fn update(
    tenant: Tenant,
    caller: AuthUser,
    ApiJson(body): ApiJson<GlobalSettings>,
) -> ApiResult<Json<GlobalSettings>> {
    let repo = SurrealSettingsRepository::new(tenant.0.db.clone());
    let saved = repo.update_global_settings(tenant.id(), body).await?;
    info!(user_id = %caller.user_id, "Global settings updated");
    Ok(Json(saved))
}

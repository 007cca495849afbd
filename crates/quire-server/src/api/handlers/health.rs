use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::api::state::AppState;

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
    version: &'static str,
    edition: &'static str,
    database: &'static str,
    multi_tenant: bool,
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let multi_tenant = state.resolver.mode().is_multi();
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        edition: if multi_tenant { "Enterprise" } else { "Community" },
        database: "surrealdb",
        multi_tenant,
    })
}

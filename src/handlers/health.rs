use axum::{extract::State, Json};
use serde::Serialize;

use crate::models::sweep::SweeperState;
use crate::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub sweeper: SweeperState,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        sweeper: state.pricing.sweeper().state(),
    })
}

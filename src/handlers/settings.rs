//! Markup settings handlers

use axum::{extract::State, Json};

use crate::error::PricingError;
use crate::models::settings::{MarkupSettings, SettingsUpdate};
use crate::AppState;

/// GET /api/settings
pub async fn get_settings(State(state): State<AppState>) -> Result<Json<MarkupSettings>, PricingError> {
    Ok(Json(state.pricing.get_settings().await?))
}

/// PUT /api/settings
///
/// Partial update; every item's suggested price is recomputed before responding.
pub async fn update_settings(
    State(state): State<AppState>,
    Json(update): Json<SettingsUpdate>,
) -> Result<Json<MarkupSettings>, PricingError> {
    Ok(Json(state.pricing.update_settings(update).await?))
}

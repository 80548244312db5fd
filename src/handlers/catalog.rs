//! Price catalog handlers
//!
//! GET /api/catalog, POST /api/catalog/refresh, PUT /api/catalog/prices

use axum::{extract::State, Json};
use tracing::info;

use crate::error::PricingError;
use crate::models::catalog::{CatalogResponse, RefreshSummary, SetPricesRequest, SetPricesResponse};
use crate::models::history::ChangeSource;
use crate::AppState;

/// GET /api/catalog
pub async fn get_catalog(State(state): State<AppState>) -> Result<Json<CatalogResponse>, PricingError> {
    let items = state.pricing.get_catalog().await?;

    Ok(Json(CatalogResponse {
        count: items.len(),
        items,
    }))
}

/// POST /api/catalog/refresh
///
/// # Response
/// - 200: Refresh summary
/// - 503: Reference feed failed or timed out; nothing was written
pub async fn refresh_catalog(State(state): State<AppState>) -> Result<Json<RefreshSummary>, PricingError> {
    info!("Catalog refresh requested");
    let summary = state.pricing.refresh_catalog().await?;
    Ok(Json(summary))
}

/// PUT /api/catalog/prices
///
/// # Response
/// - 200: Number of prices written
/// - 400: Negative price (nothing written)
/// - 404: Unknown item id (nothing written)
pub async fn set_actual_prices(
    State(state): State<AppState>,
    Json(request): Json<SetPricesRequest>,
) -> Result<Json<SetPricesResponse>, PricingError> {
    let source = request.source.unwrap_or(ChangeSource::Manual);
    let updated = state.pricing.set_actual_prices(request.prices, source).await?;

    Ok(Json(SetPricesResponse { updated }))
}

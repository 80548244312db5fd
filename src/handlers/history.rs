//! Price history handler

use axum::{
    extract::{Query, State},
    Json,
};

use crate::error::PricingError;
use crate::models::history::{HistoryQuery, HistoryResponse};
use crate::AppState;

/// GET /api/history?item_id=&limit=
///
/// Ledger entries, newest first.
pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, PricingError> {
    let entries = state
        .pricing
        .get_history(query.item_id.as_deref(), query.limit)
        .await?;

    Ok(Json(HistoryResponse {
        count: entries.len(),
        entries,
    }))
}

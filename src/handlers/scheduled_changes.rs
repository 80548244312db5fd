//! Scheduled price change handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::error::PricingError;
use crate::models::catalog::PricedItem;
use crate::models::scheduled_change::{
    CreateScheduledChangeRequest, ListScheduledChangesQuery, ScheduledChange,
    ScheduledChangesResponse,
};
use crate::models::sweep::ApplyDueResponse;
use crate::AppState;

/// POST /api/scheduled-changes
///
/// # Response
/// - 201: Created change
/// - 400: Negative price or `effectiveAt` not in the future
/// - 404: Unknown item
pub async fn create_scheduled_change(
    State(state): State<AppState>,
    Json(request): Json<CreateScheduledChangeRequest>,
) -> Result<(StatusCode, Json<ScheduledChange>), PricingError> {
    let change = state
        .pricing
        .create_scheduled_change(&request.item_id, request.scheduled_price, request.effective_at)
        .await?;

    Ok((StatusCode::CREATED, Json(change)))
}

/// GET /api/scheduled-changes?item_id=
///
/// Pending changes only, ordered by effective time.
pub async fn list_scheduled_changes(
    State(state): State<AppState>,
    Query(query): Query<ListScheduledChangesQuery>,
) -> Result<Json<ScheduledChangesResponse>, PricingError> {
    let changes = state
        .pricing
        .list_scheduled_changes(query.item_id.as_deref())
        .await?;

    Ok(Json(ScheduledChangesResponse {
        count: changes.len(),
        changes,
    }))
}

/// DELETE /api/scheduled-changes/{id}
///
/// # Response
/// - 204: Cancelled
/// - 404: Unknown change
/// - 409: Already applied
pub async fn cancel_scheduled_change(
    State(state): State<AppState>,
    Path(change_id): Path<i64>,
) -> Result<StatusCode, PricingError> {
    state.pricing.cancel_scheduled_change(change_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/scheduled-changes/{id}/apply
///
/// # Response
/// - 200: The item after the change
/// - 404: Unknown change or item
/// - 409: Already applied
pub async fn apply_scheduled_change(
    State(state): State<AppState>,
    Path(change_id): Path<i64>,
) -> Result<Json<PricedItem>, PricingError> {
    info!(change_id, "Manual apply requested");
    Ok(Json(state.pricing.apply_scheduled_change(change_id).await?))
}

/// POST /api/scheduled-changes/apply-due
pub async fn apply_due_scheduled_changes(
    State(state): State<AppState>,
) -> Result<Json<ApplyDueResponse>, PricingError> {
    let report = state.pricing.apply_due_scheduled_changes().await?;

    Ok(Json(ApplyDueResponse {
        applied: report.applied,
        report,
    }))
}

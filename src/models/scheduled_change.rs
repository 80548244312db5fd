//! Scheduled price change models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A future-dated price change for one item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledChange {
    pub id: i64,
    pub item_id: String,
    pub scheduled_price: Decimal,
    pub effective_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub applied: bool,
    pub applied_at: Option<DateTime<Utc>>,
}

impl ScheduledChange {
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        !self.applied && self.effective_at <= now
    }
}

/// Insert payload; the store assigns `id`
#[derive(Debug, Clone)]
pub struct NewScheduledChange {
    pub item_id: String,
    pub scheduled_price: Decimal,
    pub effective_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Pending change joined with the target item's current state at read time
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledChangeView {
    #[serde(flatten)]
    pub change: ScheduledChange,
    pub item_name: Option<String>,
    pub current_price: Option<Decimal>,
}

/// Selection used by the registry when reading the store
#[derive(Debug, Clone, Default)]
pub struct ScheduledChangeFilter {
    pub pending_only: bool,
    pub item_id: Option<String>,
    /// Only changes due at this instant (unapplied, `effective_at <= due_at`)
    pub due_at: Option<DateTime<Utc>>,
}

impl ScheduledChangeFilter {
    pub fn pending() -> Self {
        Self {
            pending_only: true,
            ..Default::default()
        }
    }

    pub fn matches(&self, change: &ScheduledChange) -> bool {
        if self.pending_only && change.applied {
            return false;
        }
        if let Some(item_id) = &self.item_id {
            if &change.item_id != item_id {
                return false;
            }
        }
        if let Some(due_at) = self.due_at {
            if !change.is_due(due_at) {
                return false;
            }
        }
        true
    }
}

/// Request body for POST /api/scheduled-changes
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateScheduledChangeRequest {
    pub item_id: String,
    pub scheduled_price: Decimal,
    pub effective_at: DateTime<Utc>,
}

/// Query parameters for GET /api/scheduled-changes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListScheduledChangesQuery {
    pub item_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledChangesResponse {
    pub changes: Vec<ScheduledChangeView>,
    pub count: usize,
}

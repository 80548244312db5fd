//! Due-change sweep models

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome of one sweep over due scheduled changes
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub swept_at: Option<DateTime<Utc>>,
    /// Changes found due at `swept_at`
    pub due: usize,
    /// Successful applications
    pub applied: usize,
    /// Changes applied or cancelled by a concurrent caller after the scan
    pub skipped: usize,
    /// Changes that stay pending for the next sweep
    pub failed_ids: Vec<i64>,
}

/// Sweeper lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SweeperState {
    Idle,
    Sweeping,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyDueResponse {
    pub applied: usize,
    pub report: SweepReport,
}

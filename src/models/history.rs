//! Price history ledger models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Cause of an actual-price transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeSource {
    Manual,
    Scheduled,
    CatalogRefreshInitial,
}

impl ChangeSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeSource::Manual => "manual",
            ChangeSource::Scheduled => "scheduled",
            ChangeSource::CatalogRefreshInitial => "catalog_refresh_initial",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "manual" => Some(ChangeSource::Manual),
            "scheduled" => Some(ChangeSource::Scheduled),
            "catalog_refresh_initial" => Some(ChangeSource::CatalogRefreshInitial),
            _ => None,
        }
    }
}

impl std::fmt::Display for ChangeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable ledger row; one per actual-price transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: i64,
    pub item_id: String,
    pub previous_price: Decimal,
    pub new_price: Decimal,
    pub changed_at: DateTime<Utc>,
    pub change_source: ChangeSource,
}

/// Query parameters for GET /api/history
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    pub item_id: Option<String>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub entries: Vec<HistoryEntry>,
    pub count: usize,
}

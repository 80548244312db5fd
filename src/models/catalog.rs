//! Price catalog models
//!
//! `PricedItem` is the current state of one metered product. Reference prices
//! arrive from the external feed as `ReferencePrice` records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::history::ChangeSource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedItem {
    /// Stable external key, e.g. a model identifier
    pub id: String,
    pub name: String,
    pub provider: String,
    /// Unit price reported by the reference feed
    pub reference_price: Decimal,
    /// `reference_price` plus the configured markup; never edited directly
    pub suggested_price: Decimal,
    /// Operator-controlled price served to consumers
    pub actual_price: Decimal,
    pub last_updated: DateTime<Utc>,
}

/// One record from the reference price feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferencePrice {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub reference_price: Decimal,
}

/// Request body for PUT /api/catalog/prices
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPricesRequest {
    /// item id -> new actual price
    pub prices: HashMap<String, Decimal>,
    /// Defaults to `manual`
    #[serde(default)]
    pub source: Option<ChangeSource>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogResponse {
    pub items: Vec<PricedItem>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshSummary {
    pub fetched: usize,
    pub created: usize,
    pub updated: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPricesResponse {
    pub updated: usize,
}

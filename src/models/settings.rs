//! Markup settings models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Default percentage markup applied on first access
pub const DEFAULT_PERCENTAGE_MARKUP: Decimal = dec!(25);

/// Default flat fee applied on first access
pub const DEFAULT_FLAT_FEE_MARKUP: Decimal = dec!(0.2);

/// The single live markup configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkupSettings {
    /// Percent, e.g. 25 for +25%
    pub percentage_markup: Decimal,
    /// Added after the percentage markup
    pub flat_fee_markup: Decimal,
    pub last_updated: DateTime<Utc>,
}

impl MarkupSettings {
    pub fn default_at(now: DateTime<Utc>) -> Self {
        Self {
            percentage_markup: DEFAULT_PERCENTAGE_MARKUP,
            flat_fee_markup: DEFAULT_FLAT_FEE_MARKUP,
            last_updated: now,
        }
    }
}

/// Partial update; omitted fields keep their current value
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub percentage_markup: Option<Decimal>,
    pub flat_fee_markup: Option<Decimal>,
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        self.percentage_markup.is_none() && self.flat_fee_markup.is_none()
    }
}

//! Storage backends for the four pricing collections
//!
//! Every method is atomic on its own. Multi-step sequences (apply, cancel) are
//! serialized per item by the services layer, so implementations only have to
//! guarantee that a single call is indivisible.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::PricingResult;
use crate::models::catalog::PricedItem;
use crate::models::history::{ChangeSource, HistoryEntry};
use crate::models::scheduled_change::{NewScheduledChange, ScheduledChange, ScheduledChangeFilter};
use crate::models::settings::MarkupSettings;

pub mod database;
pub mod memory;
#[cfg(test)]
pub(crate) mod flaky;

pub use database::DatabaseStore;
pub use memory::MemoryStore;

/// Result of an actual-price write: the updated item and its ledger row
#[derive(Debug, Clone, PartialEq)]
pub struct PriceWrite {
    pub item: PricedItem,
    pub entry: HistoryEntry,
}

/// Reference-driven update of an existing item; `actual_price` is never part of it
#[derive(Debug, Clone)]
pub struct ReferenceUpdate {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub reference_price: Decimal,
    pub suggested_price: Decimal,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait PricingStore: Send + Sync {
    /// All items ordered by provider, then id
    async fn list_items(&self) -> PricingResult<Vec<PricedItem>>;

    async fn get_item(&self, item_id: &str) -> PricingResult<Option<PricedItem>>;

    /// Insert a newly discovered item together with its first ledger entry
    /// (`0 -> actual_price`, stamped with `item.last_updated`).
    async fn insert_item(&self, item: PricedItem, source: ChangeSource) -> PricingResult<PriceWrite>;

    /// Fails with `NotFound` if the item does not exist
    async fn update_reference(&self, update: ReferenceUpdate) -> PricingResult<PricedItem>;

    /// Read the current actual price, append the ledger row and write the new
    /// price as one unit. Fails with `NotFound` if the item does not exist.
    async fn write_actual_price(
        &self,
        item_id: &str,
        new_price: Decimal,
        source: ChangeSource,
        changed_at: DateTime<Utc>,
    ) -> PricingResult<PriceWrite>;

    /// Current settings, storing `default` first if none exist yet
    async fn init_settings(&self, default: MarkupSettings) -> PricingResult<MarkupSettings>;

    /// Replace the settings singleton and overwrite suggested prices as one
    /// unit; unknown item ids are skipped. Returns item rows touched.
    async fn save_settings(
        &self,
        settings: &MarkupSettings,
        suggested_prices: Vec<(String, Decimal)>,
    ) -> PricingResult<usize>;

    async fn insert_scheduled_change(&self, change: NewScheduledChange) -> PricingResult<ScheduledChange>;

    async fn get_scheduled_change(&self, change_id: i64) -> PricingResult<Option<ScheduledChange>>;

    /// Matching changes ordered by effective time, then id
    async fn list_scheduled_changes(
        &self,
        filter: &ScheduledChangeFilter,
    ) -> PricingResult<Vec<ScheduledChange>>;

    /// Delete the change only while it is unapplied. Returns whether a row was removed.
    async fn delete_pending_change(&self, change_id: i64) -> PricingResult<bool>;

    /// Flip `applied` from false to true. Returns false if the change was
    /// missing or already applied, so exactly one caller can win.
    async fn mark_change_applied(&self, change_id: i64, applied_at: DateTime<Utc>) -> PricingResult<bool>;

    /// Ledger rows, newest first
    async fn list_history(&self, item_id: Option<&str>, limit: Option<u64>) -> PricingResult<Vec<HistoryEntry>>;
}

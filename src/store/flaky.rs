//! Test store that fails actual-price writes on demand

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::HashMap;

use super::{MemoryStore, PriceWrite, PricingStore, ReferenceUpdate};
use crate::error::{PricingError, PricingResult};
use crate::models::catalog::PricedItem;
use crate::models::history::{ChangeSource, HistoryEntry};
use crate::models::scheduled_change::{NewScheduledChange, ScheduledChange, ScheduledChangeFilter};
use crate::models::settings::MarkupSettings;

/// `MemoryStore` whose `write_actual_price` fails for selected items
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    /// item id -> writes still to fail
    failing_writes: Mutex<HashMap<String, usize>>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `times` actual-price writes to `item_id`
    pub fn fail_writes(&self, item_id: &str, times: usize) {
        self.failing_writes.lock().insert(item_id.to_string(), times);
    }

    fn take_failure(&self, item_id: &str) -> bool {
        let mut failing = self.failing_writes.lock();
        match failing.get_mut(item_id) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }
}

#[async_trait]
impl PricingStore for FlakyStore {
    async fn list_items(&self) -> PricingResult<Vec<PricedItem>> {
        self.inner.list_items().await
    }

    async fn get_item(&self, item_id: &str) -> PricingResult<Option<PricedItem>> {
        self.inner.get_item(item_id).await
    }

    async fn insert_item(&self, item: PricedItem, source: ChangeSource) -> PricingResult<PriceWrite> {
        self.inner.insert_item(item, source).await
    }

    async fn update_reference(&self, update: ReferenceUpdate) -> PricingResult<PricedItem> {
        self.inner.update_reference(update).await
    }

    async fn write_actual_price(
        &self,
        item_id: &str,
        new_price: Decimal,
        source: ChangeSource,
        changed_at: DateTime<Utc>,
    ) -> PricingResult<PriceWrite> {
        if self.take_failure(item_id) {
            return Err(PricingError::Internal(format!(
                "Database error: connection reset while writing '{}'",
                item_id
            )));
        }
        self.inner
            .write_actual_price(item_id, new_price, source, changed_at)
            .await
    }

    async fn init_settings(&self, default: MarkupSettings) -> PricingResult<MarkupSettings> {
        self.inner.init_settings(default).await
    }

    async fn save_settings(
        &self,
        settings: &MarkupSettings,
        suggested_prices: Vec<(String, Decimal)>,
    ) -> PricingResult<usize> {
        self.inner.save_settings(settings, suggested_prices).await
    }

    async fn insert_scheduled_change(&self, change: NewScheduledChange) -> PricingResult<ScheduledChange> {
        self.inner.insert_scheduled_change(change).await
    }

    async fn get_scheduled_change(&self, change_id: i64) -> PricingResult<Option<ScheduledChange>> {
        self.inner.get_scheduled_change(change_id).await
    }

    async fn list_scheduled_changes(
        &self,
        filter: &ScheduledChangeFilter,
    ) -> PricingResult<Vec<ScheduledChange>> {
        self.inner.list_scheduled_changes(filter).await
    }

    async fn delete_pending_change(&self, change_id: i64) -> PricingResult<bool> {
        self.inner.delete_pending_change(change_id).await
    }

    async fn mark_change_applied(&self, change_id: i64, applied_at: DateTime<Utc>) -> PricingResult<bool> {
        self.inner.mark_change_applied(change_id, applied_at).await
    }

    async fn list_history(&self, item_id: Option<&str>, limit: Option<u64>) -> PricingResult<Vec<HistoryEntry>> {
        self.inner.list_history(item_id, limit).await
    }
}

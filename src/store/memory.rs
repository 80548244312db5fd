//! In-memory store
//!
//! All collections live behind one lock, so each trait call is trivially atomic.
//! Used when no database is configured and by the test suite.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

use super::{PriceWrite, PricingStore, ReferenceUpdate};
use crate::error::{PricingError, PricingResult};
use crate::models::catalog::PricedItem;
use crate::models::history::{ChangeSource, HistoryEntry};
use crate::models::scheduled_change::{NewScheduledChange, ScheduledChange, ScheduledChangeFilter};
use crate::models::settings::MarkupSettings;

#[derive(Debug, Default)]
struct MemoryState {
    items: HashMap<String, PricedItem>,
    settings: Option<MarkupSettings>,
    changes: BTreeMap<i64, ScheduledChange>,
    /// Append-only; index order is ledger order
    history: Vec<HistoryEntry>,
    last_change_id: i64,
    last_history_id: i64,
}

impl MemoryState {
    fn append_history(
        &mut self,
        item_id: &str,
        previous_price: Decimal,
        new_price: Decimal,
        source: ChangeSource,
        changed_at: DateTime<Utc>,
    ) -> HistoryEntry {
        self.last_history_id += 1;
        let entry = HistoryEntry {
            id: self.last_history_id,
            item_id: item_id.to_string(),
            previous_price,
            new_price,
            changed_at,
            change_source: source,
        };
        self.history.push(entry.clone());
        entry
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PricingStore for MemoryStore {
    async fn list_items(&self) -> PricingResult<Vec<PricedItem>> {
        let state = self.state.read();
        let mut items: Vec<PricedItem> = state.items.values().cloned().collect();
        items.sort_by(|a, b| a.provider.cmp(&b.provider).then_with(|| a.id.cmp(&b.id)));
        Ok(items)
    }

    async fn get_item(&self, item_id: &str) -> PricingResult<Option<PricedItem>> {
        Ok(self.state.read().items.get(item_id).cloned())
    }

    async fn insert_item(&self, item: PricedItem, source: ChangeSource) -> PricingResult<PriceWrite> {
        let mut state = self.state.write();
        if state.items.contains_key(&item.id) {
            return Err(PricingError::Internal(format!(
                "priced item '{}' already exists",
                item.id
            )));
        }

        let entry = state.append_history(
            &item.id,
            Decimal::ZERO,
            item.actual_price,
            source,
            item.last_updated,
        );
        state.items.insert(item.id.clone(), item.clone());

        Ok(PriceWrite { item, entry })
    }

    async fn update_reference(&self, update: ReferenceUpdate) -> PricingResult<PricedItem> {
        let mut state = self.state.write();
        let item = state
            .items
            .get_mut(&update.id)
            .ok_or_else(|| PricingError::item_not_found(&update.id))?;

        item.name = update.name;
        item.provider = update.provider;
        item.reference_price = update.reference_price;
        item.suggested_price = update.suggested_price;
        item.last_updated = update.updated_at;

        Ok(item.clone())
    }

    async fn write_actual_price(
        &self,
        item_id: &str,
        new_price: Decimal,
        source: ChangeSource,
        changed_at: DateTime<Utc>,
    ) -> PricingResult<PriceWrite> {
        let mut state = self.state.write();
        let previous_price = state
            .items
            .get(item_id)
            .map(|item| item.actual_price)
            .ok_or_else(|| PricingError::item_not_found(item_id))?;

        let entry = state.append_history(item_id, previous_price, new_price, source, changed_at);

        let item = state
            .items
            .get_mut(item_id)
            .ok_or_else(|| PricingError::item_not_found(item_id))?;
        item.actual_price = new_price;
        item.last_updated = changed_at;

        Ok(PriceWrite {
            item: item.clone(),
            entry,
        })
    }

    async fn init_settings(&self, default: MarkupSettings) -> PricingResult<MarkupSettings> {
        let mut state = self.state.write();
        Ok(state.settings.get_or_insert(default).clone())
    }

    async fn save_settings(
        &self,
        settings: &MarkupSettings,
        suggested_prices: Vec<(String, Decimal)>,
    ) -> PricingResult<usize> {
        let mut state = self.state.write();
        state.settings = Some(settings.clone());

        let mut touched = 0;
        for (item_id, suggested_price) in suggested_prices {
            if let Some(item) = state.items.get_mut(&item_id) {
                item.suggested_price = suggested_price;
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn insert_scheduled_change(&self, change: NewScheduledChange) -> PricingResult<ScheduledChange> {
        let mut state = self.state.write();
        state.last_change_id += 1;
        let stored = ScheduledChange {
            id: state.last_change_id,
            item_id: change.item_id,
            scheduled_price: change.scheduled_price,
            effective_at: change.effective_at,
            created_at: change.created_at,
            applied: false,
            applied_at: None,
        };
        state.changes.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_scheduled_change(&self, change_id: i64) -> PricingResult<Option<ScheduledChange>> {
        Ok(self.state.read().changes.get(&change_id).cloned())
    }

    async fn list_scheduled_changes(
        &self,
        filter: &ScheduledChangeFilter,
    ) -> PricingResult<Vec<ScheduledChange>> {
        let state = self.state.read();
        let mut changes: Vec<ScheduledChange> = state
            .changes
            .values()
            .filter(|change| filter.matches(change))
            .cloned()
            .collect();
        changes.sort_by(|a, b| a.effective_at.cmp(&b.effective_at).then_with(|| a.id.cmp(&b.id)));
        Ok(changes)
    }

    async fn delete_pending_change(&self, change_id: i64) -> PricingResult<bool> {
        let mut state = self.state.write();
        match state.changes.get(&change_id) {
            Some(change) if !change.applied => {
                state.changes.remove(&change_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_change_applied(&self, change_id: i64, applied_at: DateTime<Utc>) -> PricingResult<bool> {
        let mut state = self.state.write();
        match state.changes.get_mut(&change_id) {
            Some(change) if !change.applied => {
                change.applied = true;
                change.applied_at = Some(applied_at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_history(&self, item_id: Option<&str>, limit: Option<u64>) -> PricingResult<Vec<HistoryEntry>> {
        let state = self.state.read();
        let limit = limit.map(|l| l as usize).unwrap_or(usize::MAX);
        Ok(state
            .history
            .iter()
            .rev()
            .filter(|entry| item_id.is_none_or(|id| entry.item_id == id))
            .take(limit)
            .cloned()
            .collect())
    }
}

//! Price catalog
//!
//! Sole writer of `actual_price` and `suggested_price`. Every actual-price
//! transition goes through `PricingStore::write_actual_price`, which appends
//! the ledger row in the same atomic step.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{PricingError, PricingResult};
use crate::models::catalog::{PricedItem, ReferencePrice};
use crate::models::history::ChangeSource;
use crate::models::settings::MarkupSettings;
use crate::services::item_locks::{ItemGuard, ItemLocks};
use crate::services::markup::{self, ensure_valid_amount};
use crate::store::{PriceWrite, PricingStore, ReferenceUpdate};

/// What `upsert_from_reference` did to the item
#[derive(Debug, Clone, PartialEq)]
pub enum UpsertOutcome {
    /// New item; carries its initial ledger entry
    Created(PriceWrite),
    /// Existing item; actual price untouched
    Updated(PricedItem),
}

#[derive(Clone)]
pub struct PriceCatalog {
    store: Arc<dyn PricingStore>,
    locks: ItemLocks,
}

impl PriceCatalog {
    pub fn new(store: Arc<dyn PricingStore>, locks: ItemLocks) -> Self {
        Self { store, locks }
    }

    pub fn locks(&self) -> &ItemLocks {
        &self.locks
    }

    pub async fn list_items(&self) -> PricingResult<Vec<PricedItem>> {
        self.store.list_items().await
    }

    pub async fn find_item(&self, item_id: &str) -> PricingResult<Option<PricedItem>> {
        self.store.get_item(item_id).await
    }

    pub async fn get_item(&self, item_id: &str) -> PricingResult<PricedItem> {
        self.store
            .get_item(item_id)
            .await?
            .ok_or_else(|| PricingError::item_not_found(item_id))
    }

    /// Push a reference price and its precomputed suggested price into the catalog.
    ///
    /// Existing items get the new reference and suggested price while keeping
    /// their actual price. New items start with `actual_price = suggested_price`
    /// and an initial `catalog_refresh_initial` ledger entry.
    pub async fn upsert_from_reference(
        &self,
        reference: &ReferencePrice,
        suggested_price: Decimal,
        now: DateTime<Utc>,
    ) -> PricingResult<UpsertOutcome> {
        let _guard = self.locks.lock(&reference.id).await;

        if self.store.get_item(&reference.id).await?.is_some() {
            let item = self
                .store
                .update_reference(ReferenceUpdate {
                    id: reference.id.clone(),
                    name: reference.name.clone(),
                    provider: reference.provider.clone(),
                    reference_price: reference.reference_price,
                    suggested_price,
                    updated_at: now,
                })
                .await?;

            debug!(
                item_id = %item.id,
                reference_price = %item.reference_price,
                suggested_price = %item.suggested_price,
                "Updated reference price"
            );
            return Ok(UpsertOutcome::Updated(item));
        }

        let item = PricedItem {
            id: reference.id.clone(),
            name: reference.name.clone(),
            provider: reference.provider.clone(),
            reference_price: reference.reference_price,
            suggested_price,
            actual_price: suggested_price,
            last_updated: now,
        };
        let write = self
            .store
            .insert_item(item, ChangeSource::CatalogRefreshInitial)
            .await?;

        info!(
            item_id = %write.item.id,
            provider = %write.item.provider,
            actual_price = %write.item.actual_price,
            "Added new priced item"
        );
        Ok(UpsertOutcome::Created(write))
    }

    /// Change an item's actual price and record the transition in the ledger
    pub async fn set_actual_price(
        &self,
        item_id: &str,
        new_price: Decimal,
        source: ChangeSource,
    ) -> PricingResult<PriceWrite> {
        let guard = self.locks.lock(item_id).await;
        self.set_actual_price_locked(&guard, item_id, new_price, source, Utc::now())
            .await
    }

    /// Same as `set_actual_price` for a caller already holding the item's guard
    pub(crate) async fn set_actual_price_locked(
        &self,
        _guard: &ItemGuard,
        item_id: &str,
        new_price: Decimal,
        source: ChangeSource,
        now: DateTime<Utc>,
    ) -> PricingResult<PriceWrite> {
        ensure_valid_amount("price", new_price)?;

        let write = self
            .store
            .write_actual_price(item_id, new_price, source, now)
            .await?;

        info!(
            item_id = %item_id,
            previous_price = %write.entry.previous_price,
            new_price = %write.entry.new_price,
            source = %source,
            "Actual price changed"
        );
        Ok(write)
    }

    /// Every item's suggested price under `settings`, without writing anything.
    ///
    /// Fails as a whole if any item's price cannot be computed.
    pub async fn suggested_prices_under(
        &self,
        settings: &MarkupSettings,
    ) -> PricingResult<Vec<(String, Decimal)>> {
        let items = self.store.list_items().await?;

        let mut prices = Vec::with_capacity(items.len());
        for item in &items {
            let suggested_price = markup::suggested_price(item.reference_price, settings)
                .map_err(|e| {
                    PricingError::InvalidArgument(format!(
                        "settings would make item '{}' unpriceable: {}",
                        item.id, e
                    ))
                })?;
            prices.push((item.id.clone(), suggested_price));
        }

        debug!(items = prices.len(), "Computed suggested prices");
        Ok(prices)
    }
}

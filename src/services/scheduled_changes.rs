//! Scheduled change registry
//!
//! Holds future-dated price changes. Application is at-most-once: the catalog
//! write happens first and only then is the entry flipped to applied with a
//! compare-and-set, all under the target item's guard. A failed catalog write
//! leaves the entry pending for a later retry.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{PricingError, PricingResult};
use crate::models::history::ChangeSource;
use crate::models::scheduled_change::{
    NewScheduledChange, ScheduledChange, ScheduledChangeFilter, ScheduledChangeView,
};
use crate::services::catalog::PriceCatalog;
use crate::services::markup::ensure_valid_amount;
use crate::store::{PriceWrite, PricingStore};

#[derive(Clone)]
pub struct ScheduledChangeRegistry {
    store: Arc<dyn PricingStore>,
    catalog: PriceCatalog,
}

impl ScheduledChangeRegistry {
    pub fn new(store: Arc<dyn PricingStore>, catalog: PriceCatalog) -> Self {
        Self { store, catalog }
    }

    pub async fn create(
        &self,
        item_id: &str,
        scheduled_price: Decimal,
        effective_at: DateTime<Utc>,
    ) -> PricingResult<ScheduledChange> {
        self.create_at(item_id, scheduled_price, effective_at, Utc::now())
            .await
    }

    /// Schedule `scheduled_price` for `item_id`; `effective_at` must be after `now`
    pub async fn create_at(
        &self,
        item_id: &str,
        scheduled_price: Decimal,
        effective_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> PricingResult<ScheduledChange> {
        ensure_valid_amount("scheduledPrice", scheduled_price)?;
        if effective_at <= now {
            return Err(PricingError::InvalidArgument(format!(
                "effectiveAt must be in the future (got {}, now {})",
                effective_at.to_rfc3339(),
                now.to_rfc3339()
            )));
        }

        self.catalog.get_item(item_id).await?;

        let change = self
            .store
            .insert_scheduled_change(NewScheduledChange {
                item_id: item_id.to_string(),
                scheduled_price,
                effective_at,
                created_at: now,
            })
            .await?;

        info!(
            change_id = change.id,
            item_id = %change.item_id,
            scheduled_price = %change.scheduled_price,
            effective_at = %change.effective_at.to_rfc3339(),
            "Scheduled price change created"
        );
        Ok(change)
    }

    pub async fn get(&self, change_id: i64) -> PricingResult<ScheduledChange> {
        self.store
            .get_scheduled_change(change_id)
            .await?
            .ok_or_else(|| PricingError::change_not_found(change_id))
    }

    /// All unapplied changes with the target item's current state joined in
    pub async fn list_pending(&self) -> PricingResult<Vec<ScheduledChangeView>> {
        let changes = self
            .store
            .list_scheduled_changes(&ScheduledChangeFilter::pending())
            .await?;

        let items: HashMap<String, _> = self
            .catalog
            .list_items()
            .await?
            .into_iter()
            .map(|item| (item.id.clone(), item))
            .collect();

        Ok(changes
            .into_iter()
            .map(|change| {
                let item = items.get(&change.item_id);
                ScheduledChangeView {
                    item_name: item.map(|i| i.name.clone()),
                    current_price: item.map(|i| i.actual_price),
                    change,
                }
            })
            .collect())
    }

    pub async fn list_pending_for_item(&self, item_id: &str) -> PricingResult<Vec<ScheduledChangeView>> {
        let filter = ScheduledChangeFilter {
            pending_only: true,
            item_id: Some(item_id.to_string()),
            due_at: None,
        };
        let changes = self.store.list_scheduled_changes(&filter).await?;
        let item = self.catalog.find_item(item_id).await?;

        Ok(changes
            .into_iter()
            .map(|change| ScheduledChangeView {
                item_name: item.as_ref().map(|i| i.name.clone()),
                current_price: item.as_ref().map(|i| i.actual_price),
                change,
            })
            .collect())
    }

    /// Unapplied changes whose effective time is at or before `now`
    pub async fn list_due(&self, now: DateTime<Utc>) -> PricingResult<Vec<ScheduledChange>> {
        let filter = ScheduledChangeFilter {
            pending_only: true,
            item_id: None,
            due_at: Some(now),
        };
        self.store.list_scheduled_changes(&filter).await
    }

    /// Remove a pending change. Applied changes are kept as a record of intent.
    pub async fn cancel(&self, change_id: i64) -> PricingResult<()> {
        let change = self.get(change_id).await?;
        let _guard = self.catalog.locks().lock(&change.item_id).await;

        let change = self.get(change_id).await?;
        if change.applied {
            return Err(PricingError::FailedPrecondition(format!(
                "scheduled change {} has already been applied",
                change_id
            )));
        }

        if !self.store.delete_pending_change(change_id).await? {
            return Err(PricingError::FailedPrecondition(format!(
                "scheduled change {} changed state while cancelling",
                change_id
            )));
        }

        info!(change_id, item_id = %change.item_id, "Scheduled price change cancelled");
        Ok(())
    }

    pub async fn apply(&self, change_id: i64) -> PricingResult<PriceWrite> {
        self.apply_at(change_id, Utc::now()).await
    }

    /// Apply a pending change, stamping the ledger row with `now`.
    ///
    /// Fails with `FailedPrecondition` if the change is already applied, so a
    /// losing racer can tell it did nothing.
    pub async fn apply_at(&self, change_id: i64, now: DateTime<Utc>) -> PricingResult<PriceWrite> {
        let change = self.get(change_id).await?;
        let guard = self.catalog.locks().lock(&change.item_id).await;

        // Re-read under the guard; a concurrent apply or cancel may have finished meanwhile
        let change = self.get(change_id).await?;
        if change.applied {
            return Err(PricingError::FailedPrecondition(format!(
                "scheduled change {} has already been applied",
                change_id
            )));
        }

        let write = self
            .catalog
            .set_actual_price_locked(
                &guard,
                &change.item_id,
                change.scheduled_price,
                ChangeSource::Scheduled,
                now,
            )
            .await?;

        if !self.store.mark_change_applied(change_id, now).await? {
            warn!(
                change_id,
                item_id = %change.item_id,
                history_id = write.entry.id,
                "Scheduled change was applied elsewhere after the catalog write; ledger holds a duplicate row"
            );
            return Err(PricingError::FailedPrecondition(format!(
                "scheduled change {} has already been applied",
                change_id
            )));
        }

        info!(
            change_id,
            item_id = %change.item_id,
            previous_price = %write.entry.previous_price,
            new_price = %write.entry.new_price,
            "Scheduled price change applied"
        );
        Ok(write)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::ReferencePrice;
    use crate::services::item_locks::ItemLocks;
    use crate::store::flaky::FlakyStore;
    use crate::store::MemoryStore;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    async fn registry_over<S: PricingStore + 'static>(
        store: Arc<S>,
        item_id: &str,
    ) -> ScheduledChangeRegistry {
        let catalog = PriceCatalog::new(store.clone(), ItemLocks::new());
        catalog
            .upsert_from_reference(
                &ReferencePrice {
                    id: item_id.to_string(),
                    name: "Model One".to_string(),
                    provider: "acme".to_string(),
                    reference_price: dec!(10),
                },
                dec!(12.70),
                Utc::now(),
            )
            .await
            .unwrap();

        ScheduledChangeRegistry::new(store, catalog)
    }

    async fn registry_with_item(item_id: &str) -> (ScheduledChangeRegistry, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (registry_over(store.clone(), item_id).await, store)
    }

    #[tokio::test]
    async fn test_create_validation() {
        let (registry, _) = registry_with_item("m1").await;
        let now = Utc::now();

        assert!(matches!(
            registry.create_at("m1", dec!(15), now, now).await,
            Err(PricingError::InvalidArgument(_))
        ));
        assert!(matches!(
            registry.create_at("m1", dec!(15), now - Duration::seconds(1), now).await,
            Err(PricingError::InvalidArgument(_))
        ));
        assert!(matches!(
            registry.create_at("m1", dec!(-15), now + Duration::hours(1), now).await,
            Err(PricingError::InvalidArgument(_))
        ));
        assert!(matches!(
            registry.create_at("nope", dec!(15), now + Duration::hours(1), now).await,
            Err(PricingError::NotFound(_))
        ));

        let change = registry
            .create_at("m1", dec!(15), now + Duration::hours(1), now)
            .await
            .unwrap();
        assert!(!change.applied);
        assert_eq!(change.created_at, now);
    }

    #[tokio::test]
    async fn test_apply_twice_writes_one_history_entry() {
        let (registry, store) = registry_with_item("m1").await;
        let now = Utc::now();
        let change = registry
            .create_at("m1", dec!(15), now + Duration::hours(1), now)
            .await
            .unwrap();

        let write = registry.apply(change.id).await.unwrap();
        assert_eq!(write.item.actual_price, dec!(15));
        assert_eq!(write.entry.previous_price, dec!(12.70));

        let second = registry.apply(change.id).await;
        assert!(matches!(second, Err(PricingError::FailedPrecondition(_))));

        let history = store.list_history(Some("m1"), None).await.unwrap();
        let scheduled: Vec<_> = history
            .iter()
            .filter(|e| e.change_source == ChangeSource::Scheduled)
            .collect();
        assert_eq!(scheduled.len(), 1);
        assert!(registry.get(change.id).await.unwrap().applied);
    }

    #[tokio::test]
    async fn test_cancel_lifecycle() {
        let (registry, _) = registry_with_item("m1").await;
        let now = Utc::now();
        let pending = registry
            .create_at("m1", dec!(15), now + Duration::hours(1), now)
            .await
            .unwrap();
        let applied = registry
            .create_at("m1", dec!(16), now + Duration::hours(2), now)
            .await
            .unwrap();
        registry.apply(applied.id).await.unwrap();

        registry.cancel(pending.id).await.unwrap();
        assert!(registry
            .list_pending()
            .await
            .unwrap()
            .iter()
            .all(|view| view.change.id != pending.id));
        assert!(matches!(registry.apply(pending.id).await, Err(PricingError::NotFound(_))));
        assert!(matches!(registry.cancel(pending.id).await, Err(PricingError::NotFound(_))));

        assert!(matches!(
            registry.cancel(applied.id).await,
            Err(PricingError::FailedPrecondition(_))
        ));
    }

    #[tokio::test]
    async fn test_pending_views_join_current_price() {
        let (registry, _) = registry_with_item("m1").await;
        let now = Utc::now();
        registry
            .create_at("m1", dec!(15), now + Duration::hours(2), now)
            .await
            .unwrap();
        registry
            .create_at("m1", dec!(14), now + Duration::hours(1), now)
            .await
            .unwrap();

        let views = registry.list_pending_for_item("m1").await.unwrap();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].change.scheduled_price, dec!(14));
        assert_eq!(views[0].current_price, Some(dec!(12.70)));
        assert_eq!(views[0].item_name.as_deref(), Some("Model One"));

        assert!(registry.list_pending_for_item("m2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_apply_has_single_winner() {
        let (registry, store) = registry_with_item("m1").await;
        let now = Utc::now();
        let change = registry
            .create_at("m1", dec!(15), now + Duration::hours(1), now)
            .await
            .unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                tokio::spawn(async move { registry.apply(change.id).await })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(PricingError::FailedPrecondition(_)) => {}
                Err(e) => panic!("unexpected error: {}", e),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(store.list_history(Some("m1"), None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_catalog_write_leaves_change_pending_for_retry() {
        let store = Arc::new(FlakyStore::new());
        let registry = registry_over(store.clone(), "m1").await;
        let now = Utc::now();
        let change = registry
            .create_at("m1", dec!(15), now + Duration::hours(1), now)
            .await
            .unwrap();

        store.fail_writes("m1", 1);
        assert!(matches!(
            registry.apply(change.id).await,
            Err(PricingError::Internal(_))
        ));

        let stored = registry.get(change.id).await.unwrap();
        assert!(!stored.applied);
        assert!(stored.applied_at.is_none());
        assert_eq!(store.list_history(Some("m1"), None).await.unwrap().len(), 1);
        assert_eq!(
            store.get_item("m1").await.unwrap().unwrap().actual_price,
            dec!(12.70)
        );

        let write = registry.apply(change.id).await.unwrap();
        assert_eq!(write.item.actual_price, dec!(15));
        assert_eq!(write.entry.previous_price, dec!(12.70));
        assert!(registry.get(change.id).await.unwrap().applied);
        assert_eq!(store.list_history(Some("m1"), None).await.unwrap().len(), 2);
    }
}

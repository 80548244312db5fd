//! Pricing service
//!
//! One cloneable handle over catalog, settings, registry and sweeper, exposing
//! the operations the HTTP layer, the sweeper job and the CLI share.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::{PricingError, PricingResult};
use crate::models::catalog::{PricedItem, ReferencePrice, RefreshSummary};
use crate::models::history::{ChangeSource, HistoryEntry};
use crate::models::scheduled_change::{ScheduledChange, ScheduledChangeView};
use crate::models::settings::{MarkupSettings, SettingsUpdate};
use crate::models::sweep::SweepReport;
use crate::services::catalog::{PriceCatalog, UpsertOutcome};
use crate::services::due_changes::DueChangeSweeper;
use crate::services::history::HistoryLedger;
use crate::services::item_locks::ItemLocks;
use crate::services::markup::{self, ensure_valid_amount};
use crate::services::reference_prices::ReferencePriceSource;
use crate::services::scheduled_changes::ScheduledChangeRegistry;
use crate::services::settings::SettingsStore;
use crate::store::PricingStore;

/// Default upper bound for one reference price fetch
pub const DEFAULT_REFERENCE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct PricingService {
    catalog: PriceCatalog,
    settings: SettingsStore,
    ledger: HistoryLedger,
    registry: ScheduledChangeRegistry,
    sweeper: DueChangeSweeper,
    reference_source: Arc<dyn ReferencePriceSource>,
    reference_timeout: Duration,
    /// Refreshes hold it shared, settings updates exclusively, so a refresh
    /// never computes suggested prices from settings that are being replaced
    settings_gate: Arc<RwLock<()>>,
}

impl PricingService {
    pub fn new(
        store: Arc<dyn PricingStore>,
        reference_source: Arc<dyn ReferencePriceSource>,
        reference_timeout: Duration,
    ) -> Self {
        let catalog = PriceCatalog::new(store.clone(), ItemLocks::new());
        let registry = ScheduledChangeRegistry::new(store.clone(), catalog.clone());
        let sweeper = DueChangeSweeper::new(registry.clone());

        Self {
            catalog,
            settings: SettingsStore::new(store.clone()),
            ledger: HistoryLedger::new(store),
            registry,
            sweeper,
            reference_source,
            reference_timeout,
            settings_gate: Arc::new(RwLock::new(())),
        }
    }

    pub fn catalog(&self) -> &PriceCatalog {
        &self.catalog
    }

    pub fn registry(&self) -> &ScheduledChangeRegistry {
        &self.registry
    }

    pub fn sweeper(&self) -> &DueChangeSweeper {
        &self.sweeper
    }

    pub async fn get_catalog(&self) -> PricingResult<Vec<PricedItem>> {
        self.catalog.list_items().await
    }

    /// Fetch reference prices and upsert every record.
    ///
    /// The fetch is bounded by the reference timeout, and every record is
    /// validated and priced before the first write, so a failed or malformed
    /// fetch changes nothing.
    /// Items absent from the feed are left untouched.
    pub async fn refresh_catalog(&self) -> PricingResult<RefreshSummary> {
        let _gate = self.settings_gate.read().await;

        let prices = tokio::time::timeout(
            self.reference_timeout,
            self.reference_source.fetch_reference_prices(),
        )
        .await
        .map_err(|_| {
            PricingError::Unavailable(format!(
                "reference price fetch timed out after {}s",
                self.reference_timeout.as_secs()
            ))
        })??;

        let settings = self.settings.get().await?;
        let priced = price_reference_batch(&prices, &settings)?;
        let now = Utc::now();
        let mut summary = RefreshSummary {
            fetched: prices.len(),
            created: 0,
            updated: 0,
        };

        for (reference, suggested_price) in priced {
            match self
                .catalog
                .upsert_from_reference(reference, suggested_price, now)
                .await?
            {
                UpsertOutcome::Created(_) => summary.created += 1,
                UpsertOutcome::Updated(_) => summary.updated += 1,
            }
        }

        info!(
            fetched = summary.fetched,
            created = summary.created,
            updated = summary.updated,
            "Catalog refresh complete"
        );
        Ok(summary)
    }

    /// Set several actual prices at once.
    ///
    /// Every id and price is validated before anything is written.
    pub async fn set_actual_prices(
        &self,
        prices: HashMap<String, Decimal>,
        source: ChangeSource,
    ) -> PricingResult<usize> {
        let mut entries: Vec<(String, Decimal)> = prices.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        for (item_id, price) in &entries {
            ensure_valid_amount(&format!("price for '{}'", item_id), *price)?;
            self.catalog.get_item(item_id).await?;
        }

        for (item_id, price) in &entries {
            self.catalog.set_actual_price(item_id, *price, source).await?;
        }

        Ok(entries.len())
    }

    pub async fn get_settings(&self) -> PricingResult<MarkupSettings> {
        self.settings.get().await
    }

    /// Update markup settings and recompute every suggested price.
    ///
    /// Suggested prices are computed under the new settings first; if any
    /// item cannot be priced, neither the settings nor the catalog change.
    pub async fn update_settings(&self, update: SettingsUpdate) -> PricingResult<MarkupSettings> {
        let _gate = self.settings_gate.write().await;

        let settings = self.settings.prepare(update).await?;
        let suggested_prices = self.catalog.suggested_prices_under(&settings).await?;
        self.settings.commit(&settings, suggested_prices).await?;
        Ok(settings)
    }

    pub async fn create_scheduled_change(
        &self,
        item_id: &str,
        scheduled_price: Decimal,
        effective_at: DateTime<Utc>,
    ) -> PricingResult<ScheduledChange> {
        self.registry
            .create(item_id, scheduled_price, effective_at)
            .await
    }

    pub async fn list_scheduled_changes(
        &self,
        item_id: Option<&str>,
    ) -> PricingResult<Vec<ScheduledChangeView>> {
        match item_id {
            Some(item_id) => self.registry.list_pending_for_item(item_id).await,
            None => self.registry.list_pending().await,
        }
    }

    pub async fn cancel_scheduled_change(&self, change_id: i64) -> PricingResult<()> {
        self.registry.cancel(change_id).await
    }

    pub async fn apply_scheduled_change(&self, change_id: i64) -> PricingResult<PricedItem> {
        Ok(self.registry.apply(change_id).await?.item)
    }

    /// Run one sweep out of band; safe alongside the timer-driven job
    pub async fn apply_due_scheduled_changes(&self) -> PricingResult<SweepReport> {
        self.sweeper.sweep().await
    }

    /// Ledger rows, newest first; `NotFound` for an unknown item id
    pub async fn get_history(
        &self,
        item_id: Option<&str>,
        limit: Option<u64>,
    ) -> PricingResult<Vec<HistoryEntry>> {
        if let Some(item_id) = item_id {
            self.catalog.get_item(item_id).await?;
        }
        self.ledger.entries(item_id, limit).await
    }
}

/// Validate a fetched batch and compute each record's suggested price.
/// Any bad record rejects the whole batch as `Unavailable`.
fn price_reference_batch<'a>(
    prices: &'a [ReferencePrice],
    settings: &MarkupSettings,
) -> PricingResult<Vec<(&'a ReferencePrice, Decimal)>> {
    let mut priced = Vec::with_capacity(prices.len());

    for reference in prices {
        if reference.id.trim().is_empty() {
            warn!("Reference feed returned a record without an id");
            return Err(PricingError::Unavailable(
                "reference feed returned a record without an id".to_string(),
            ));
        }

        let suggested_price = markup::suggested_price(reference.reference_price, settings)
            .map_err(|e| {
                warn!(item_id = %reference.id, price = %reference.reference_price, error = %e, "Unusable reference price");
                PricingError::Unavailable(format!(
                    "reference feed returned unusable price {} for '{}': {}",
                    reference.reference_price, reference.id, e
                ))
            })?;
        priced.push((reference, suggested_price));
    }

    Ok(priced)
}

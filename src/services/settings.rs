//! Markup settings store
//!
//! Single live record, replaced in place. A replacement is staged with
//! `prepare` and written by `commit` together with the suggested prices it
//! implies, so stored settings and suggested prices never disagree.

use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

use crate::error::{PricingError, PricingResult};
use crate::models::settings::{MarkupSettings, SettingsUpdate};
use crate::services::markup::ensure_valid_amount;
use crate::store::PricingStore;

#[derive(Clone)]
pub struct SettingsStore {
    store: Arc<dyn PricingStore>,
}

impl SettingsStore {
    pub fn new(store: Arc<dyn PricingStore>) -> Self {
        Self { store }
    }

    /// Current settings, creating the defaults (25%, 0.20) on first access
    pub async fn get(&self) -> PricingResult<MarkupSettings> {
        self.store
            .init_settings(MarkupSettings::default_at(Utc::now()))
            .await
    }

    /// Validate a partial update and return the settings it would produce.
    /// Nothing is written.
    pub async fn prepare(&self, update: SettingsUpdate) -> PricingResult<MarkupSettings> {
        if update.is_empty() {
            return Err(PricingError::InvalidArgument(
                "settings update must set percentageMarkup or flatFeeMarkup".to_string(),
            ));
        }
        if let Some(percentage) = update.percentage_markup {
            ensure_valid_amount("percentageMarkup", percentage)?;
        }
        if let Some(flat_fee) = update.flat_fee_markup {
            ensure_valid_amount("flatFeeMarkup", flat_fee)?;
        }

        let current = self.get().await?;
        Ok(MarkupSettings {
            percentage_markup: update.percentage_markup.unwrap_or(current.percentage_markup),
            flat_fee_markup: update.flat_fee_markup.unwrap_or(current.flat_fee_markup),
            last_updated: Utc::now(),
        })
    }

    /// Store `settings` and the suggested prices computed under them in one step
    pub async fn commit(
        &self,
        settings: &MarkupSettings,
        suggested_prices: Vec<(String, Decimal)>,
    ) -> PricingResult<usize> {
        let touched = self.store.save_settings(settings, suggested_prices).await?;

        info!(
            percentage_markup = %settings.percentage_markup,
            flat_fee_markup = %settings.flat_fee_markup,
            items = touched,
            "Markup settings updated"
        );
        Ok(touched)
    }
}

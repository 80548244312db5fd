//! PostgreSQL store built on SeaORM
//!
//! Ledger appends and price writes share one transaction; the item row is
//! locked `FOR UPDATE` so the previous price read inside it is current.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use super::{PriceWrite, PricingStore, ReferenceUpdate};
use crate::entities::{
    markup_settings, price_history, priced_items, scheduled_price_changes,
    prelude::{MarkupSettings as MarkupSettingsEntity, PriceHistory, PricedItems, ScheduledPriceChanges},
};
use crate::error::{PricingError, PricingResult};
use crate::models::catalog::PricedItem;
use crate::models::history::{ChangeSource, HistoryEntry};
use crate::models::scheduled_change::{NewScheduledChange, ScheduledChange, ScheduledChangeFilter};
use crate::models::settings::MarkupSettings;

#[derive(Clone)]
pub struct DatabaseStore {
    db: DatabaseConnection,
}

impl DatabaseStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn item_from_model(model: priced_items::Model) -> PricedItem {
    PricedItem {
        id: model.id,
        name: model.name,
        provider: model.provider,
        reference_price: model.reference_price,
        suggested_price: model.suggested_price,
        actual_price: model.actual_price,
        last_updated: model.last_updated.with_timezone(&Utc),
    }
}

fn change_from_model(model: scheduled_price_changes::Model) -> ScheduledChange {
    ScheduledChange {
        id: model.id,
        item_id: model.item_id,
        scheduled_price: model.scheduled_price,
        effective_at: model.effective_at.with_timezone(&Utc),
        created_at: model.created_at.with_timezone(&Utc),
        applied: model.applied,
        applied_at: model.applied_at.map(|t| t.with_timezone(&Utc)),
    }
}

fn history_from_model(model: price_history::Model) -> PricingResult<HistoryEntry> {
    let change_source = ChangeSource::parse(&model.change_source).ok_or_else(|| {
        PricingError::Internal(format!(
            "unknown change source '{}' in history row {}",
            model.change_source, model.id
        ))
    })?;

    Ok(HistoryEntry {
        id: model.id,
        item_id: model.item_id,
        previous_price: model.previous_price,
        new_price: model.new_price,
        changed_at: model.changed_at.with_timezone(&Utc),
        change_source,
    })
}

fn settings_from_model(model: markup_settings::Model) -> MarkupSettings {
    MarkupSettings {
        percentage_markup: model.percentage_markup,
        flat_fee_markup: model.flat_fee_markup,
        last_updated: model.last_updated.with_timezone(&Utc),
    }
}

fn settings_active_model(settings: &MarkupSettings) -> markup_settings::ActiveModel {
    markup_settings::ActiveModel {
        id: Set(markup_settings::SINGLETON_ID),
        percentage_markup: Set(settings.percentage_markup),
        flat_fee_markup: Set(settings.flat_fee_markup),
        last_updated: Set(settings.last_updated.into()),
    }
}

fn history_active_model(
    item_id: &str,
    previous_price: Decimal,
    new_price: Decimal,
    source: ChangeSource,
    changed_at: DateTime<Utc>,
) -> price_history::ActiveModel {
    price_history::ActiveModel {
        item_id: Set(item_id.to_string()),
        previous_price: Set(previous_price),
        new_price: Set(new_price),
        changed_at: Set(changed_at.into()),
        change_source: Set(source.as_str().to_string()),
        ..Default::default()
    }
}

#[async_trait]
impl PricingStore for DatabaseStore {
    async fn list_items(&self) -> PricingResult<Vec<PricedItem>> {
        let items = PricedItems::find()
            .order_by_asc(priced_items::Column::Provider)
            .order_by_asc(priced_items::Column::Id)
            .all(&self.db)
            .await?;

        Ok(items.into_iter().map(item_from_model).collect())
    }

    async fn get_item(&self, item_id: &str) -> PricingResult<Option<PricedItem>> {
        let item = PricedItems::find_by_id(item_id.to_string())
            .one(&self.db)
            .await?;

        Ok(item.map(item_from_model))
    }

    async fn insert_item(&self, item: PricedItem, source: ChangeSource) -> PricingResult<PriceWrite> {
        let txn = self.db.begin().await?;

        let new_item = priced_items::ActiveModel {
            id: Set(item.id.clone()),
            name: Set(item.name.clone()),
            provider: Set(item.provider.clone()),
            reference_price: Set(item.reference_price),
            suggested_price: Set(item.suggested_price),
            actual_price: Set(item.actual_price),
            last_updated: Set(item.last_updated.into()),
        };
        let inserted = new_item.insert(&txn).await?;

        let entry = history_active_model(
            &item.id,
            Decimal::ZERO,
            item.actual_price,
            source,
            item.last_updated,
        )
        .insert(&txn)
        .await?;

        txn.commit().await?;

        Ok(PriceWrite {
            item: item_from_model(inserted),
            entry: history_from_model(entry)?,
        })
    }

    async fn update_reference(&self, update: ReferenceUpdate) -> PricingResult<PricedItem> {
        let existing = PricedItems::find_by_id(update.id.clone())
            .one(&self.db)
            .await?
            .ok_or_else(|| PricingError::item_not_found(&update.id))?;

        let mut active_model = existing.into_active_model();
        active_model.name = Set(update.name);
        active_model.provider = Set(update.provider);
        active_model.reference_price = Set(update.reference_price);
        active_model.suggested_price = Set(update.suggested_price);
        active_model.last_updated = Set(update.updated_at.into());
        let updated = active_model.update(&self.db).await?;

        Ok(item_from_model(updated))
    }

    async fn write_actual_price(
        &self,
        item_id: &str,
        new_price: Decimal,
        source: ChangeSource,
        changed_at: DateTime<Utc>,
    ) -> PricingResult<PriceWrite> {
        let txn = self.db.begin().await?;

        let existing = PricedItems::find_by_id(item_id.to_string())
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| PricingError::item_not_found(item_id))?;
        let previous_price = existing.actual_price;

        let entry = history_active_model(item_id, previous_price, new_price, source, changed_at)
            .insert(&txn)
            .await?;

        let mut active_model = existing.into_active_model();
        active_model.actual_price = Set(new_price);
        active_model.last_updated = Set(changed_at.into());
        let updated = active_model.update(&txn).await?;

        txn.commit().await?;

        Ok(PriceWrite {
            item: item_from_model(updated),
            entry: history_from_model(entry)?,
        })
    }

    async fn init_settings(&self, default: MarkupSettings) -> PricingResult<MarkupSettings> {
        if let Some(existing) = MarkupSettingsEntity::find_by_id(markup_settings::SINGLETON_ID)
            .one(&self.db)
            .await?
        {
            return Ok(settings_from_model(existing));
        }

        // A concurrent first access may win the insert; either way the row exists afterwards
        MarkupSettingsEntity::insert(settings_active_model(&default))
            .on_conflict(
                OnConflict::column(markup_settings::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        MarkupSettingsEntity::find_by_id(markup_settings::SINGLETON_ID)
            .one(&self.db)
            .await?
            .map(settings_from_model)
            .ok_or_else(|| PricingError::Internal("markup settings row missing after insert".to_string()))
    }

    async fn save_settings(
        &self,
        settings: &MarkupSettings,
        suggested_prices: Vec<(String, Decimal)>,
    ) -> PricingResult<usize> {
        let txn = self.db.begin().await?;

        MarkupSettingsEntity::insert(settings_active_model(settings))
            .on_conflict(
                OnConflict::column(markup_settings::Column::Id)
                    .update_columns([
                        markup_settings::Column::PercentageMarkup,
                        markup_settings::Column::FlatFeeMarkup,
                        markup_settings::Column::LastUpdated,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;

        let mut touched = 0;
        for (item_id, suggested_price) in suggested_prices {
            let result = PricedItems::update_many()
                .col_expr(priced_items::Column::SuggestedPrice, Expr::value(suggested_price))
                .filter(priced_items::Column::Id.eq(item_id))
                .exec(&txn)
                .await?;
            touched += result.rows_affected as usize;
        }

        txn.commit().await?;
        Ok(touched)
    }

    async fn insert_scheduled_change(&self, change: NewScheduledChange) -> PricingResult<ScheduledChange> {
        let new_change = scheduled_price_changes::ActiveModel {
            item_id: Set(change.item_id),
            scheduled_price: Set(change.scheduled_price),
            effective_at: Set(change.effective_at.into()),
            created_at: Set(change.created_at.into()),
            applied: Set(false),
            applied_at: Set(None),
            ..Default::default()
        };

        Ok(change_from_model(new_change.insert(&self.db).await?))
    }

    async fn get_scheduled_change(&self, change_id: i64) -> PricingResult<Option<ScheduledChange>> {
        let change = ScheduledPriceChanges::find_by_id(change_id)
            .one(&self.db)
            .await?;

        Ok(change.map(change_from_model))
    }

    async fn list_scheduled_changes(
        &self,
        filter: &ScheduledChangeFilter,
    ) -> PricingResult<Vec<ScheduledChange>> {
        let mut query = ScheduledPriceChanges::find();

        if filter.pending_only {
            query = query.filter(scheduled_price_changes::Column::Applied.eq(false));
        }
        if let Some(item_id) = &filter.item_id {
            query = query.filter(scheduled_price_changes::Column::ItemId.eq(item_id.as_str()));
        }
        if let Some(due_at) = filter.due_at {
            let due_at: sea_orm::prelude::DateTimeWithTimeZone = due_at.into();
            query = query
                .filter(scheduled_price_changes::Column::Applied.eq(false))
                .filter(scheduled_price_changes::Column::EffectiveAt.lte(due_at));
        }

        let changes = query
            .order_by_asc(scheduled_price_changes::Column::EffectiveAt)
            .order_by_asc(scheduled_price_changes::Column::Id)
            .all(&self.db)
            .await?;

        Ok(changes.into_iter().map(change_from_model).collect())
    }

    async fn delete_pending_change(&self, change_id: i64) -> PricingResult<bool> {
        let result = ScheduledPriceChanges::delete_many()
            .filter(scheduled_price_changes::Column::Id.eq(change_id))
            .filter(scheduled_price_changes::Column::Applied.eq(false))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    async fn mark_change_applied(&self, change_id: i64, applied_at: DateTime<Utc>) -> PricingResult<bool> {
        let applied_at: sea_orm::prelude::DateTimeWithTimeZone = applied_at.into();
        let result = ScheduledPriceChanges::update_many()
            .col_expr(scheduled_price_changes::Column::Applied, Expr::value(true))
            .col_expr(scheduled_price_changes::Column::AppliedAt, Expr::value(applied_at))
            .filter(scheduled_price_changes::Column::Id.eq(change_id))
            .filter(scheduled_price_changes::Column::Applied.eq(false))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    async fn list_history(&self, item_id: Option<&str>, limit: Option<u64>) -> PricingResult<Vec<HistoryEntry>> {
        let mut query = PriceHistory::find();
        if let Some(item_id) = item_id {
            query = query.filter(price_history::Column::ItemId.eq(item_id));
        }

        let rows = query
            .order_by_desc(price_history::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?;

        rows.into_iter().map(history_from_model).collect()
    }
}

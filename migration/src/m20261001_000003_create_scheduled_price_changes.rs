use sea_orm_migration::prelude::*;

use crate::m20261001_000001_create_priced_items::PricedItems;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ScheduledPriceChanges::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ScheduledPriceChanges::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ScheduledPriceChanges::ItemId)
                            .string_len(200)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ScheduledPriceChanges::ScheduledPrice)
                            .decimal_len(38, 10)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ScheduledPriceChanges::EffectiveAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ScheduledPriceChanges::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .col(
                        ColumnDef::new(ScheduledPriceChanges::Applied)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ScheduledPriceChanges::AppliedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_scheduled_price_changes_item")
                            .from(ScheduledPriceChanges::Table, ScheduledPriceChanges::ItemId)
                            .to(PricedItems::Table, PricedItems::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Sweeper scan: unapplied rows ordered by effective time
        manager
            .create_index(
                Index::create()
                    .name("idx_scheduled_price_changes_pending")
                    .table(ScheduledPriceChanges::Table)
                    .col(ScheduledPriceChanges::Applied)
                    .col(ScheduledPriceChanges::EffectiveAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_scheduled_price_changes_item")
                    .table(ScheduledPriceChanges::Table)
                    .col(ScheduledPriceChanges::ItemId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ScheduledPriceChanges::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ScheduledPriceChanges {
    Table,
    Id,
    ItemId,
    ScheduledPrice,
    EffectiveAt,
    CreatedAt,
    Applied,
    AppliedAt,
}

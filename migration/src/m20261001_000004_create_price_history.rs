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
                    .table(PriceHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PriceHistory::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PriceHistory::ItemId).string_len(200).not_null())
                    .col(
                        ColumnDef::new(PriceHistory::PreviousPrice)
                            .decimal_len(38, 10)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PriceHistory::NewPrice)
                            .decimal_len(38, 10)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PriceHistory::ChangedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .col(
                        ColumnDef::new(PriceHistory::ChangeSource)
                            .string_len(32)
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_price_history_item")
                            .from(PriceHistory::Table, PriceHistory::ItemId)
                            .to(PricedItems::Table, PricedItems::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // (item_id, changed_at DESC) for newest-first history reads
        manager
            .create_index(
                Index::create()
                    .name("idx_price_history_item_time")
                    .table(PriceHistory::Table)
                    .col(PriceHistory::ItemId)
                    .col((PriceHistory::ChangedAt, IndexOrder::Desc))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PriceHistory::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PriceHistory {
    Table,
    Id,
    ItemId,
    PreviousPrice,
    NewPrice,
    ChangedAt,
    ChangeSource,
}

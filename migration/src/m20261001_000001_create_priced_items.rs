use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PricedItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PricedItems::Id)
                            .string_len(200)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PricedItems::Name).string_len(255).not_null())
                    .col(ColumnDef::new(PricedItems::Provider).string_len(100).not_null())
                    .col(
                        ColumnDef::new(PricedItems::ReferencePrice)
                            .decimal_len(38, 10)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PricedItems::SuggestedPrice)
                            .decimal_len(38, 10)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PricedItems::ActualPrice)
                            .decimal_len(38, 10)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PricedItems::LastUpdated)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_priced_items_provider")
                    .table(PricedItems::Table)
                    .col(PricedItems::Provider)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PricedItems::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum PricedItems {
    Table,
    Id,
    Name,
    Provider,
    ReferencePrice,
    SuggestedPrice,
    ActualPrice,
    LastUpdated,
}

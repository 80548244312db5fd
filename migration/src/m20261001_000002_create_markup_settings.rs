use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Single-row table; the application always reads and writes id = 1
        manager
            .create_table(
                Table::create()
                    .table(MarkupSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MarkupSettings::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MarkupSettings::PercentageMarkup)
                            .decimal_len(38, 10)
                            .not_null()
                            .default(25),
                    )
                    .col(
                        ColumnDef::new(MarkupSettings::FlatFeeMarkup)
                            .decimal_len(38, 10)
                            .not_null()
                            .default(0.2),
                    )
                    .col(
                        ColumnDef::new(MarkupSettings::LastUpdated)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .check(Expr::col(MarkupSettings::Id).eq(1))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MarkupSettings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum MarkupSettings {
    Table,
    Id,
    PercentageMarkup,
    FlatFeeMarkup,
    LastUpdated,
}

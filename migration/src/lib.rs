pub use sea_orm_migration::prelude::*;

mod m20261001_000001_create_priced_items;
mod m20261001_000002_create_markup_settings;
mod m20261001_000003_create_scheduled_price_changes;
mod m20261001_000004_create_price_history;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_priced_items::Migration),
            Box::new(m20261001_000002_create_markup_settings::Migration),
            Box::new(m20261001_000003_create_scheduled_price_changes::Migration),
            Box::new(m20261001_000004_create_price_history::Migration),
        ]
    }
}

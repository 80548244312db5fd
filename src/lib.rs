// src/lib.rs

use sea_orm::{Database, DbErr};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;

use config::AppConfig;
use error::PricingResult;
use services::pricing::PricingService;
use services::reference_prices::{
    HttpReferencePriceClient, ReferencePriceSource, UnconfiguredReferenceSource,
};
use store::{DatabaseStore, MemoryStore, PricingStore};

#[derive(Clone)]
pub struct AppState {
    pub pricing: PricingService,
}

pub mod entities {
    pub mod prelude;
    pub mod markup_settings;
    pub mod price_history;
    pub mod priced_items;
    pub mod scheduled_price_changes;
}

pub mod services {
    pub mod catalog;
    pub mod due_changes;
    pub mod history;
    pub mod item_locks;
    pub mod markup;
    pub mod pricing;
    pub mod reference_prices;
    pub mod scheduled_changes;
    pub mod settings;
}

pub mod config;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod models;
pub mod store;

/// Open the configured store: PostgreSQL (migrated) when `DATABASE_URL` is
/// set, otherwise an empty in-memory store
pub async fn connect_store(config: &AppConfig) -> Result<Arc<dyn PricingStore>, DbErr> {
    match &config.database_url {
        Some(database_url) => {
            tracing::info!("Connecting to database...");
            let db = Database::connect(database_url).await?;

            tracing::info!("Running migrations...");
            migration::Migrator::up(&db, None).await?;

            Ok(Arc::new(DatabaseStore::new(db)))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store (state is lost on restart)");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Wire the pricing service over `store` using the configured reference feed
pub fn build_pricing_service(
    config: &AppConfig,
    store: Arc<dyn PricingStore>,
) -> PricingResult<PricingService> {
    let reference_source: Arc<dyn ReferencePriceSource> = match &config.reference_prices_url {
        Some(url) => Arc::new(HttpReferencePriceClient::new(
            url.clone(),
            config.reference_timeout,
        )?),
        None => {
            tracing::warn!("REFERENCE_PRICES_URL not set, catalog refresh is disabled");
            Arc::new(UnconfiguredReferenceSource)
        }
    };

    Ok(PricingService::new(
        store,
        reference_source,
        config.reference_timeout,
    ))
}

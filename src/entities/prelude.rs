//! `SeaORM` Entity prelude

pub use super::markup_settings::Entity as MarkupSettings;
pub use super::price_history::Entity as PriceHistory;
pub use super::priced_items::Entity as PricedItems;
pub use super::scheduled_price_changes::Entity as ScheduledPriceChanges;

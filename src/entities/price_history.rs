//! `SeaORM` Entity for the append-only price_history ledger

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "price_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub item_id: String,
    #[sea_orm(column_type = "Decimal(Some((38, 10)))")]
    pub previous_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((38, 10)))")]
    pub new_price: Decimal,
    pub changed_at: DateTimeWithTimeZone,
    /// 'manual', 'scheduled' or 'catalog_refresh_initial'
    pub change_source: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

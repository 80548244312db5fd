//! `SeaORM` Entity for scheduled_price_changes table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "scheduled_price_changes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub item_id: String,
    #[sea_orm(column_type = "Decimal(Some((38, 10)))")]
    pub scheduled_price: Decimal,
    pub effective_at: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
    pub applied: bool,
    pub applied_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

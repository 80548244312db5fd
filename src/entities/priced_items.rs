//! `SeaORM` Entity for priced_items table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "priced_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub provider: String,
    #[sea_orm(column_type = "Decimal(Some((38, 10)))")]
    pub reference_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((38, 10)))")]
    pub suggested_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((38, 10)))")]
    pub actual_price: Decimal,
    pub last_updated: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

//! `SeaORM` Entity, @generated manually

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "exchange_info")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub symbol: String,
    pub base_asset: String,
    pub quote_asset: String,
    #[sea_orm(column_type = "Decimal(Some((24, 8)))")]
    pub min_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((24, 8)))")]
    pub tick_size: Decimal,
    #[sea_orm(column_type = "Decimal(Some((24, 8)))")]
    pub min_qty: Decimal,
    #[sea_orm(column_type = "Decimal(Some((24, 8)))")]
    pub step_size: Decimal,
    #[sea_orm(column_type = "Decimal(Some((24, 8)))")]
    pub min_notional: Decimal,
    pub created_at: Option<DateTimeUtc>,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

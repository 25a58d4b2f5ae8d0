//! `SeaORM` Entities for the per-interval candlestick tables, @generated manually
//!
//! Every table shares one layout; the macro keeps the column list in one place.

macro_rules! candlestick_entity {
    ($module:ident, $table:tt) => {
        pub mod $module {
            use sea_orm::entity::prelude::*;

            #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
            #[sea_orm(table_name = $table)]
            pub struct Model {
                #[sea_orm(primary_key, auto_increment = false)]
                pub symbol: String,
                #[sea_orm(primary_key, auto_increment = false)]
                pub datetime: DateTimeUtc, // bucket open, second precision
                #[sea_orm(column_type = "Decimal(Some((24, 8)))")]
                pub open: Decimal,
                #[sea_orm(column_type = "Decimal(Some((24, 8)))")]
                pub high: Decimal,
                #[sea_orm(column_type = "Decimal(Some((24, 8)))")]
                pub low: Decimal,
                #[sea_orm(column_type = "Decimal(Some((24, 8)))")]
                pub close: Decimal,
                #[sea_orm(column_type = "Decimal(Some((24, 8)))")]
                pub volume: Decimal,
                pub created_at: Option<DateTimeUtc>,
                pub updated_at: Option<DateTimeUtc>,
            }

            #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
            pub enum Relation {}

            impl ActiveModelBehavior for ActiveModel {}
        }
    };
}

candlestick_entity!(candlesticks_1m, "candlesticks_1m");
candlestick_entity!(candlesticks_5m, "candlesticks_5m");
candlestick_entity!(candlesticks_15m, "candlesticks_15m");
candlestick_entity!(candlesticks_1h, "candlesticks_1h");
candlestick_entity!(candlesticks_4h, "candlesticks_4h");
candlestick_entity!(candlesticks_1d, "candlesticks_1d");

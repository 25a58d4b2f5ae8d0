use sea_orm_migration::prelude::*;

/// One table per storable kline interval; all share the same layout.
const CANDLESTICK_TABLES: [&str; 6] = [
    "candlesticks_1m",
    "candlesticks_5m",
    "candlesticks_15m",
    "candlesticks_1h",
    "candlesticks_4h",
    "candlesticks_1d",
];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in CANDLESTICK_TABLES {
            manager
                .create_table(
                    Table::create()
                        .table(Alias::new(table))
                        .if_not_exists()
                        .col(ColumnDef::new(Candlesticks::Symbol).string_len(32).not_null())
                        .col(ColumnDef::new(Candlesticks::Datetime).timestamp().not_null())
                        .col(ColumnDef::new(Candlesticks::Open).decimal_len(24, 8).not_null())
                        .col(ColumnDef::new(Candlesticks::High).decimal_len(24, 8).not_null())
                        .col(ColumnDef::new(Candlesticks::Low).decimal_len(24, 8).not_null())
                        .col(ColumnDef::new(Candlesticks::Close).decimal_len(24, 8).not_null())
                        .col(ColumnDef::new(Candlesticks::Volume).decimal_len(24, 8).not_null())
                        .col(ColumnDef::new(Candlesticks::CreatedAt).timestamp().null())
                        .col(ColumnDef::new(Candlesticks::UpdatedAt).timestamp().null())
                        // (symbol, datetime) is the upsert key
                        .primary_key(
                            Index::create()
                                .col(Candlesticks::Symbol)
                                .col(Candlesticks::Datetime),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name(format!("idx_{}_datetime", table))
                        .table(Alias::new(table))
                        .col(Candlesticks::Datetime)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in CANDLESTICK_TABLES.iter().rev() {
            manager
                .drop_table(Table::drop().table(Alias::new(*table)).if_exists().to_owned())
                .await?;
        }

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Candlesticks {
    Symbol,
    Datetime,
    Open,
    High,
    Low,
    Close,
    Volume,
    CreatedAt,
    UpdatedAt,
}

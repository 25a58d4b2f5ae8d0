use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ExchangeInfo::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ExchangeInfo::Symbol).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(ExchangeInfo::BaseAsset).string_len(16).not_null())
                    .col(ColumnDef::new(ExchangeInfo::QuoteAsset).string_len(16).not_null())
                    .col(ColumnDef::new(ExchangeInfo::MinPrice).decimal_len(24, 8).not_null())
                    .col(ColumnDef::new(ExchangeInfo::TickSize).decimal_len(24, 8).not_null())
                    .col(ColumnDef::new(ExchangeInfo::MinQty).decimal_len(24, 8).not_null())
                    .col(ColumnDef::new(ExchangeInfo::StepSize).decimal_len(24, 8).not_null())
                    .col(ColumnDef::new(ExchangeInfo::MinNotional).decimal_len(24, 8).not_null())
                    .col(ColumnDef::new(ExchangeInfo::CreatedAt).timestamp().null())
                    .col(ColumnDef::new(ExchangeInfo::UpdatedAt).timestamp().null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ExchangeInfo::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ExchangeInfo {
    Table,
    Symbol,
    BaseAsset,
    QuoteAsset,
    MinPrice,
    TickSize,
    MinQty,
    StepSize,
    MinNotional,
    CreatedAt,
    UpdatedAt,
}

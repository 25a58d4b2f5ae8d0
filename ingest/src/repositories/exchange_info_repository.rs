use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue::Set, DatabaseConnection, EntityTrait, QueryOrder};
use shared::entity::exchange_info;
use shared::{ExchangeSymbolInfo, IngestError};
use std::sync::Arc;

use super::UPSERT_BATCH_SIZE;

/// Persistence for symbol metadata, keyed by symbol.
#[async_trait]
pub trait SymbolRepository: Send + Sync {
    async fn upsert_many(&self, symbols: &[ExchangeSymbolInfo]) -> Result<(), IngestError>;

    /// Every stored symbol name, ascending.
    async fn all_symbols(&self) -> Result<Vec<String>, IngestError>;

    async fn list(&self) -> Result<Vec<ExchangeSymbolInfo>, IngestError>;
}

pub struct SeaOrmSymbolRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmSymbolRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn find_all(&self) -> Result<Vec<exchange_info::Model>, IngestError> {
        let models = exchange_info::Entity::find()
            .order_by_asc(exchange_info::Column::Symbol)
            .all(self.db.as_ref())
            .await?;
        Ok(models)
    }
}

#[async_trait]
impl SymbolRepository for SeaOrmSymbolRepository {
    async fn upsert_many(&self, symbols: &[ExchangeSymbolInfo]) -> Result<(), IngestError> {
        let now = Utc::now();
        for chunk in symbols.chunks(UPSERT_BATCH_SIZE) {
            let models = chunk.iter().map(|info| exchange_info::ActiveModel {
                symbol: Set(info.symbol.clone()),
                base_asset: Set(info.base_asset.clone()),
                quote_asset: Set(info.quote_asset.clone()),
                min_price: Set(info.min_price),
                tick_size: Set(info.tick_size),
                min_qty: Set(info.min_qty),
                step_size: Set(info.step_size),
                min_notional: Set(info.min_notional),
                created_at: Set(Some(now)),
                updated_at: Set(Some(now)),
            });

            exchange_info::Entity::insert_many(models)
                .on_conflict(
                    OnConflict::column(exchange_info::Column::Symbol)
                        .update_columns([
                            exchange_info::Column::BaseAsset,
                            exchange_info::Column::QuoteAsset,
                            exchange_info::Column::MinPrice,
                            exchange_info::Column::TickSize,
                            exchange_info::Column::MinQty,
                            exchange_info::Column::StepSize,
                            exchange_info::Column::MinNotional,
                            exchange_info::Column::UpdatedAt,
                        ])
                        .to_owned(),
                )
                .exec_without_returning(self.db.as_ref())
                .await?;
        }
        Ok(())
    }

    async fn all_symbols(&self) -> Result<Vec<String>, IngestError> {
        Ok(self.find_all().await?.into_iter().map(|m| m.symbol).collect())
    }

    async fn list(&self) -> Result<Vec<ExchangeSymbolInfo>, IngestError> {
        Ok(self
            .find_all()
            .await?
            .into_iter()
            .map(|m| ExchangeSymbolInfo {
                symbol: m.symbol,
                base_asset: m.base_asset,
                quote_asset: m.quote_asset,
                min_price: m.min_price,
                tick_size: m.tick_size,
                min_qty: m.min_qty,
                step_size: m.step_size,
                min_notional: m.min_notional,
            })
            .collect())
    }
}

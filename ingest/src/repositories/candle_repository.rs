use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue::Set, DatabaseConnection, EntityTrait};
use shared::{CandleRow, IngestError, Interval};
use std::sync::Arc;

use super::UPSERT_BATCH_SIZE;

/// Persistence for candlesticks, one table per interval.
#[async_trait]
pub trait CandleRepository: Send + Sync {
    /// Inserts each row, or overwrites the OHLCV values of an existing `(symbol, datetime)` row.
    async fn upsert_many(&self, interval: Interval, rows: &[CandleRow]) -> Result<(), IngestError>;
}

pub struct SeaOrmCandleRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmCandleRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

macro_rules! upsert_rows {
    ($entity:ident, $db:expr, $rows:expr) => {{
        use shared::entity::$entity::{ActiveModel, Column, Entity};

        let now = Utc::now();
        for chunk in $rows.chunks(UPSERT_BATCH_SIZE) {
            let models = chunk.iter().map(|row| ActiveModel {
                symbol: Set(row.symbol.clone()),
                datetime: Set(row.datetime),
                open: Set(row.open),
                high: Set(row.high),
                low: Set(row.low),
                close: Set(row.close),
                volume: Set(row.volume),
                created_at: Set(Some(now)),
                updated_at: Set(Some(now)),
            });

            Entity::insert_many(models)
                .on_conflict(
                    OnConflict::columns([Column::Symbol, Column::Datetime])
                        .update_columns([
                            Column::Open,
                            Column::High,
                            Column::Low,
                            Column::Close,
                            Column::Volume,
                            Column::UpdatedAt,
                        ])
                        .to_owned(),
                )
                .exec_without_returning($db)
                .await?;
        }
        Ok(())
    }};
}

#[async_trait]
impl CandleRepository for SeaOrmCandleRepository {
    async fn upsert_many(&self, interval: Interval, rows: &[CandleRow]) -> Result<(), IngestError> {
        let db = self.db.as_ref();
        match interval {
            Interval::OneMinute => upsert_rows!(candlesticks_1m, db, rows),
            Interval::FiveMinutes => upsert_rows!(candlesticks_5m, db, rows),
            Interval::FifteenMinutes => upsert_rows!(candlesticks_15m, db, rows),
            Interval::OneHour => upsert_rows!(candlesticks_1h, db, rows),
            Interval::FourHours => upsert_rows!(candlesticks_4h, db, rows),
            Interval::OneDay => upsert_rows!(candlesticks_1d, db, rows),
            other => Err(IngestError::UnsupportedInterval(other.to_string())),
        }
    }
}

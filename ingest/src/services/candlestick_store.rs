use chrono::{DateTime, TimeZone, Utc};
use shared::{Candle, CandleRow, IngestError, Interval};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::clock::Clock;
use crate::repositories::CandleRepository;

/// Result of one `store` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOutcome {
    /// Distinct `(symbol, datetime)` keys written
    pub stored: usize,
    /// Raw open time of the last input row, whether or not it was written
    pub last_open_time_ms: Option<i64>,
}

/// Upserts fetched klines into the interval's table, skipping the in-progress bucket.
pub struct CandlestickStore {
    repo: Arc<dyn CandleRepository>,
    clock: Arc<dyn Clock>,
}

impl CandlestickStore {
    pub fn new(repo: Arc<dyn CandleRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    pub async fn store(
        &self,
        symbol: &str,
        interval: Interval,
        rows: &[Candle],
    ) -> Result<StoreOutcome, IngestError> {
        self.store_at(symbol, interval, rows, self.clock.now()).await
    }

    pub async fn store_at(
        &self,
        symbol: &str,
        interval: Interval,
        rows: &[Candle],
        now: DateTime<Utc>,
    ) -> Result<StoreOutcome, IngestError> {
        let last_open_time_ms = rows.last().map(|c| c.open_time_ms);

        // Later rows for the same key replace earlier ones.
        let mut pending: BTreeMap<DateTime<Utc>, CandleRow> = BTreeMap::new();
        for candle in rows {
            if is_in_progress(candle.open_time_ms, interval, now) {
                debug!("Skipping in-progress {} {} bucket {}", symbol, interval, candle.open_time_ms);
                continue;
            }
            let datetime = open_datetime(candle.open_time_ms)?;
            pending.insert(datetime, to_row(symbol, datetime, candle));
        }

        let rows: Vec<CandleRow> = pending.into_values().collect();
        if !rows.is_empty() {
            self.repo.upsert_many(interval, &rows).await?;
        }

        Ok(StoreOutcome {
            stored: rows.len(),
            last_open_time_ms,
        })
    }
}

fn minute_floor(seconds: i64) -> i64 {
    seconds.div_euclid(60) * 60
}

/// A row is provisional when it opens in the currently running minute, or when its
/// bucket has not closed yet.
pub fn is_in_progress(open_time_ms: i64, interval: Interval, now: DateTime<Utc>) -> bool {
    let current_minute = minute_floor(now.timestamp());
    if minute_floor(open_time_ms.div_euclid(1000)) == current_minute {
        return true;
    }

    let now_ms = now.timestamp_millis();
    match interval.duration_ms() {
        Some(width) => open_time_ms <= now_ms && now_ms < open_time_ms + width,
        None => false,
    }
}

/// UTC datetime of the bucket open, truncated to the second.
fn open_datetime(open_time_ms: i64) -> Result<DateTime<Utc>, IngestError> {
    Utc.timestamp_opt(open_time_ms.div_euclid(1000), 0)
        .single()
        .ok_or_else(|| {
            IngestError::Decode(format!("open time {} is out of range", open_time_ms))
        })
}

fn to_row(symbol: &str, datetime: DateTime<Utc>, candle: &Candle) -> CandleRow {
    CandleRow {
        symbol: symbol.to_string(),
        datetime,
        open: candle.open,
        high: candle.high,
        low: candle.low,
        close: candle.close,
        volume: candle.volume,
    }
}

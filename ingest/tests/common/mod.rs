#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use ingest::clients::{ExchangeApi, ExchangeInfoResponse};
use ingest::clock::FixedClock;
use ingest::queue::JobQueue;
use ingest::repositories::{CandleRepository, SymbolRepository};
use ingest::services::{CandlestickFetcher, CandlestickStore, IngestionService};
use rust_decimal::Decimal;
use shared::{Candle, CandleJob, CandleRow, ExchangeSymbolInfo, FetchWindow, IngestError, Interval};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// 2021-06-01 10:00:00 UTC
pub const BASE_MS: i64 = 1_622_541_600_000;
pub const MINUTE_MS: i64 = 60_000;

/// 2021-06-01 12:30:45 UTC
pub fn now() -> DateTime<Utc> {
    Utc.timestamp_opt(1_622_550_645, 0).unwrap()
}

pub fn datetime(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).unwrap()
}

pub fn candle(symbol: &str, open_time_ms: i64, close: i64) -> Candle {
    Candle {
        symbol: symbol.to_string(),
        interval: Interval::OneMinute,
        open_time_ms,
        open: Decimal::new(close - 5, 2),
        high: Decimal::new(close + 10, 2),
        low: Decimal::new(close - 10, 2),
        close: Decimal::new(close, 2),
        volume: Decimal::new(1_000, 3),
        close_time_ms: open_time_ms + MINUTE_MS - 1,
        quote_volume: Decimal::ZERO,
        trades: 1,
    }
}

/// `count` one-minute candles starting at `start_ms`.
pub fn minute_series(symbol: &str, start_ms: i64, count: usize) -> Vec<Candle> {
    (0..count)
        .map(|i| candle(symbol, start_ms + i as i64 * MINUTE_MS, 100 + i as i64))
        .collect()
}

/// Serves klines from a fixed dataset with Binance paging semantics.
pub struct ScriptedExchange {
    klines: Mutex<HashMap<String, Vec<Candle>>>,
    info: Mutex<Option<ExchangeInfoResponse>>,
    page_limit: usize,
    fail_on_call: Mutex<Option<usize>>,
    calls: Mutex<Vec<FetchWindow>>,
}

impl ScriptedExchange {
    pub fn new(page_limit: usize) -> Self {
        Self {
            klines: Mutex::new(HashMap::new()),
            info: Mutex::new(None),
            page_limit,
            fail_on_call: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_klines(&self, symbol: &str, rows: Vec<Candle>) {
        self.klines.lock().unwrap().insert(symbol.to_string(), rows);
    }

    pub fn with_exchange_info(&self, info: ExchangeInfoResponse) {
        *self.info.lock().unwrap() = Some(info);
    }

    /// The nth candlestick call (1-based) fails.
    pub fn fail_on_call(&self, n: usize) {
        *self.fail_on_call.lock().unwrap() = Some(n);
    }

    pub fn calls(&self) -> Vec<FetchWindow> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExchangeApi for ScriptedExchange {
    async fn candlesticks(&self, window: &FetchWindow) -> Result<Vec<Candle>, IngestError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(window.clone());
            calls.len()
        };
        if *self.fail_on_call.lock().unwrap() == Some(call) {
            return Err(IngestError::RemoteFetchFailure("scripted failure".to_string()));
        }

        let klines = self.klines.lock().unwrap();
        let rows = klines.get(&window.symbol).ok_or_else(|| {
            IngestError::RemoteFetchFailure(format!("Invalid symbol {}", window.symbol))
        })?;

        let in_range: Vec<Candle> = rows
            .iter()
            .filter(|c| window.start_ms.map_or(true, |s| c.open_time_ms >= s))
            .filter(|c| window.end_ms.map_or(true, |e| c.open_time_ms <= e))
            .cloned()
            .collect();

        // Without a start the exchange answers with the most recent page.
        let page = if window.start_ms.is_some() {
            in_range.into_iter().take(self.page_limit).collect()
        } else {
            let skip = in_range.len().saturating_sub(self.page_limit);
            in_range.into_iter().skip(skip).collect()
        };
        Ok(page)
    }

    async fn exchange_info(&self) -> Result<ExchangeInfoResponse, IngestError> {
        self.info
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| IngestError::RemoteFetchFailure("exchangeInfo unavailable".to_string()))
    }
}

#[derive(Default)]
pub struct MemoryCandleRepository {
    rows: Mutex<BTreeMap<(Interval, String, DateTime<Utc>), CandleRow>>,
    upserts: Mutex<usize>,
}

impl MemoryCandleRepository {
    pub fn rows(&self, interval: Interval, symbol: &str) -> Vec<CandleRow> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|((i, s, _), _)| *i == interval && s == symbol)
            .map(|(_, row)| row.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn upserts(&self) -> usize {
        *self.upserts.lock().unwrap()
    }
}

#[async_trait]
impl CandleRepository for MemoryCandleRepository {
    async fn upsert_many(&self, interval: Interval, rows: &[CandleRow]) -> Result<(), IngestError> {
        if !interval.is_storable() {
            return Err(IngestError::UnsupportedInterval(interval.to_string()));
        }
        *self.upserts.lock().unwrap() += 1;
        let mut stored = self.rows.lock().unwrap();
        for row in rows {
            stored.insert((interval, row.symbol.clone(), row.datetime), row.clone());
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemorySymbolRepository {
    symbols: Mutex<BTreeMap<String, ExchangeSymbolInfo>>,
}

impl MemorySymbolRepository {
    pub fn seeded(names: &[&str]) -> Self {
        let repo = Self::default();
        {
            let mut symbols = repo.symbols.lock().unwrap();
            for name in names {
                symbols.insert(name.to_string(), symbol_info(name));
            }
        }
        repo
    }

    pub fn get(&self, symbol: &str) -> Option<ExchangeSymbolInfo> {
        self.symbols.lock().unwrap().get(symbol).cloned()
    }
}

pub fn symbol_info(name: &str) -> ExchangeSymbolInfo {
    ExchangeSymbolInfo {
        symbol: name.to_string(),
        base_asset: name.trim_end_matches("USDT").to_string(),
        quote_asset: "USDT".to_string(),
        min_price: Decimal::ZERO,
        tick_size: Decimal::ZERO,
        min_qty: Decimal::ZERO,
        step_size: Decimal::ZERO,
        min_notional: Decimal::ZERO,
    }
}

#[async_trait]
impl SymbolRepository for MemorySymbolRepository {
    async fn upsert_many(&self, symbols: &[ExchangeSymbolInfo]) -> Result<(), IngestError> {
        let mut stored = self.symbols.lock().unwrap();
        for info in symbols {
            stored.insert(info.symbol.clone(), info.clone());
        }
        Ok(())
    }

    async fn all_symbols(&self) -> Result<Vec<String>, IngestError> {
        Ok(self.symbols.lock().unwrap().keys().cloned().collect())
    }

    async fn list(&self) -> Result<Vec<ExchangeSymbolInfo>, IngestError> {
        Ok(self.symbols.lock().unwrap().values().cloned().collect())
    }
}

/// Holds raw JSON payloads so undecodable entries can be queued too.
#[derive(Default)]
pub struct MemoryQueue {
    items: Mutex<VecDeque<String>>,
}

impl MemoryQueue {
    pub fn push_raw(&self, payload: &str) {
        self.items.lock().unwrap().push_front(payload.to_string());
    }

    pub fn jobs(&self) -> Vec<CandleJob> {
        self.items
            .lock()
            .unwrap()
            .iter()
            .rev()
            .map(|raw| serde_json::from_str(raw).unwrap())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }
}

#[async_trait]
impl JobQueue for MemoryQueue {
    async fn enqueue(&self, job: &CandleJob) -> Result<(), IngestError> {
        let payload = serde_json::to_string(job)?;
        self.items.lock().unwrap().push_front(payload);
        Ok(())
    }

    async fn dequeue(&self) -> Result<Option<CandleJob>, IngestError> {
        let payload = self.items.lock().unwrap().pop_back();
        match payload {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }
}

pub struct Harness {
    pub exchange: Arc<ScriptedExchange>,
    pub candles: Arc<MemoryCandleRepository>,
    pub symbols: Arc<MemorySymbolRepository>,
    pub queue: Arc<MemoryQueue>,
}

impl Harness {
    pub fn new(page_limit: usize) -> Self {
        Self {
            exchange: Arc::new(ScriptedExchange::new(page_limit)),
            candles: Arc::new(MemoryCandleRepository::default()),
            symbols: Arc::new(MemorySymbolRepository::default()),
            queue: Arc::new(MemoryQueue::default()),
        }
    }

    pub fn with_symbols(mut self, names: &[&str]) -> Self {
        self.symbols = Arc::new(MemorySymbolRepository::seeded(names));
        self
    }

    pub fn store(&self) -> CandlestickStore {
        CandlestickStore::new(self.candles.clone(), Arc::new(FixedClock(now())))
    }

    pub fn service(&self) -> IngestionService {
        IngestionService::new(
            CandlestickFetcher::new(self.exchange.clone(), None),
            self.store(),
            self.symbols.clone(),
            Arc::new(FixedClock(now())),
        )
    }

    pub fn queued_service(&self) -> IngestionService {
        self.service().with_queue(self.queue.clone())
    }
}

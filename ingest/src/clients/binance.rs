//! Binance spot REST client

use async_trait::async_trait;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::{Candle, ExchangeSymbolInfo, FetchWindow, IngestError};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

use super::ExchangeApi;

const KLINES_PATH: &str = "/api/v3/klines";
const EXCHANGE_INFO_PATH: &str = "/api/v3/exchangeInfo";

/// Binance rejects kline requests above this page size.
pub const MAX_KLINES_LIMIT: u16 = 1000;

pub struct BinanceClient {
    http: reqwest::Client,
    base_url: String,
    klines_limit: u16,
}

impl BinanceClient {
    pub fn new(base_url: &str, klines_limit: u16, timeout: Duration) -> Result<Self, IngestError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ingest/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            klines_limit: klines_limit.clamp(1, MAX_KLINES_LIMIT),
        })
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<String, IngestError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {} {:?}", url, query);

        let response = self.http.get(&url).query(query).send().await?;
        let status = response.status();
        let body = response.text().await?;

        check_response(path, status, body)
    }
}

/// Passes a 2xx body through; anything else becomes `RemoteFetchFailure`
/// carrying the status and the start of the body.
fn check_response(path: &str, status: StatusCode, body: String) -> Result<String, IngestError> {
    if !status.is_success() {
        return Err(IngestError::RemoteFetchFailure(format!(
            "GET {} returned {}: {}",
            path,
            status,
            truncate(&body, 200)
        )));
    }
    Ok(body)
}

#[async_trait]
impl ExchangeApi for BinanceClient {
    async fn candlesticks(&self, window: &FetchWindow) -> Result<Vec<Candle>, IngestError> {
        let body = self
            .get(KLINES_PATH, &kline_query(window, self.klines_limit))
            .await?;
        decode_klines(window, &body)
    }

    async fn exchange_info(&self) -> Result<ExchangeInfoResponse, IngestError> {
        let body = self.get(EXCHANGE_INFO_PATH, &[]).await?;
        serde_json::from_str(&body).map_err(|e| {
            IngestError::RemoteFetchFailure(format!("malformed exchangeInfo response: {}", e))
        })
    }
}

/// Query parameters for `GET /api/v3/klines`. Open bounds are omitted.
pub fn kline_query(window: &FetchWindow, limit: u16) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("symbol", window.symbol.clone()),
        ("interval", window.interval.as_str().to_string()),
    ];
    if let Some(start) = window.start_ms {
        query.push(("startTime", start.to_string()));
    }
    if let Some(end) = window.end_ms {
        query.push(("endTime", end.to_string()));
    }
    query.push(("limit", limit.to_string()));
    query
}

/// Decodes the kline payload: an array of
/// `[openTime, open, high, low, close, volume, closeTime, quoteVolume, trades, ...]` rows.
pub fn decode_klines(window: &FetchWindow, body: &str) -> Result<Vec<Candle>, IngestError> {
    let rows: Vec<Vec<Value>> = serde_json::from_str(body).map_err(|e| {
        IngestError::RemoteFetchFailure(format!("malformed klines response: {}", e))
    })?;

    rows.iter()
        .enumerate()
        .map(|(index, row)| decode_kline_row(window, row).map_err(|field| {
            IngestError::RemoteFetchFailure(format!(
                "malformed kline row {} for {}: bad {}",
                index, window.symbol, field
            ))
        }))
        .collect()
}

fn decode_kline_row(window: &FetchWindow, row: &[Value]) -> Result<Candle, &'static str> {
    let int = |idx: usize, name: &'static str| -> Result<i64, &'static str> {
        row.get(idx).and_then(Value::as_i64).ok_or(name)
    };
    let dec = |idx: usize, name: &'static str| -> Result<Decimal, &'static str> {
        row.get(idx)
            .and_then(Value::as_str)
            .and_then(|s| Decimal::from_str(s).ok())
            .ok_or(name)
    };

    Ok(Candle {
        symbol: window.symbol.clone(),
        interval: window.interval,
        open_time_ms: int(0, "open time")?,
        open: dec(1, "open")?,
        high: dec(2, "high")?,
        low: dec(3, "low")?,
        close: dec(4, "close")?,
        volume: dec(5, "volume")?,
        close_time_ms: int(6, "close time")?,
        quote_volume: dec(7, "quote volume")?,
        trades: row.get(8).and_then(Value::as_u64).ok_or("trade count")?,
    })
}

fn truncate(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

/// Subset of `GET /api/v3/exchangeInfo` used to maintain symbol metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeInfoResponse {
    pub symbols: Vec<SymbolEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolEntry {
    pub symbol: String,
    pub base_asset: String,
    pub quote_asset: String,
    #[serde(default)]
    pub filters: Vec<SymbolFilter>,
}

/// One entry of a symbol's `filters` list. Only the fields we persist are decoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolFilter {
    pub filter_type: String,
    #[serde(default)]
    pub min_price: Option<Decimal>,
    #[serde(default)]
    pub tick_size: Option<Decimal>,
    #[serde(default)]
    pub min_qty: Option<Decimal>,
    #[serde(default)]
    pub step_size: Option<Decimal>,
    #[serde(default)]
    pub min_notional: Option<Decimal>,
}

impl SymbolEntry {
    fn filter(&self, filter_type: &str) -> Option<&SymbolFilter> {
        self.filters.iter().find(|f| f.filter_type == filter_type)
    }

    /// Flattens the price, lot-size and notional filters. Missing values become zero.
    pub fn to_symbol_info(&self) -> ExchangeSymbolInfo {
        let price = self.filter("PRICE_FILTER");
        let lot = self.filter("LOT_SIZE");
        let notional = self
            .filter("MIN_NOTIONAL")
            .or_else(|| self.filter("NOTIONAL"));

        ExchangeSymbolInfo {
            symbol: self.symbol.clone(),
            base_asset: self.base_asset.clone(),
            quote_asset: self.quote_asset.clone(),
            min_price: price.and_then(|f| f.min_price).unwrap_or_default(),
            tick_size: price.and_then(|f| f.tick_size).unwrap_or_default(),
            min_qty: lot.and_then(|f| f.min_qty).unwrap_or_default(),
            step_size: lot.and_then(|f| f.step_size).unwrap_or_default(),
            min_notional: notional.and_then(|f| f.min_notional).unwrap_or_default(),
        }
    }
}

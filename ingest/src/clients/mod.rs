//! Exchange API collaborators

pub mod binance;

pub use binance::*;

use async_trait::async_trait;
use shared::{Candle, FetchWindow, IngestError};

/// The exchange endpoints the ingestion core relies on.
#[async_trait]
pub trait ExchangeApi: Send + Sync {
    /// Kline rows for the window, ascending by open time.
    async fn candlesticks(&self, window: &FetchWindow) -> Result<Vec<Candle>, IngestError>;

    async fn exchange_info(&self) -> Result<ExchangeInfoResponse, IngestError>;
}

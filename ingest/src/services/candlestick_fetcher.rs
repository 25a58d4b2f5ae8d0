use shared::{Candle, FetchWindow, IngestError, Interval};
use std::sync::Arc;
use tracing::{info, warn};

use crate::archive::RawArchive;
use crate::clients::ExchangeApi;

/// Pulls one page of klines for a symbol/interval/range.
pub struct CandlestickFetcher {
    api: Arc<dyn ExchangeApi>,
    archive: Option<RawArchive>,
}

impl CandlestickFetcher {
    pub fn new(api: Arc<dyn ExchangeApi>, archive: Option<RawArchive>) -> Self {
        Self { api, archive }
    }

    pub async fn fetch(
        &self,
        symbol: &str,
        interval: Interval,
        start_ms: Option<i64>,
        end_ms: Option<i64>,
    ) -> Result<Vec<Candle>, IngestError> {
        let window = FetchWindow::new(symbol, interval, start_ms, end_ms);

        info!("Fetching {} candlesticks", window);
        let candles = self.api.candlesticks(&window).await?;
        info!("{} candlesticks fetched.", candles.len());

        if let Some(archive) = &self.archive {
            let filename = archive_filename(&window, candles.last());
            // Archival is best effort; the fetched page is still returned.
            if let Err(e) = archive.write(&filename, &candles).await {
                warn!("Failed to archive {}: {}", filename, e);
            }
        }

        Ok(candles)
    }
}

fn archive_filename(window: &FetchWindow, last: Option<&Candle>) -> String {
    let bound = |v: Option<i64>| v.map(|ms| ms.to_string()).unwrap_or_default();
    format!(
        "candlesticks-{}-{}-s-{}-e-{}.json",
        window.symbol,
        window.interval,
        bound(window.start_ms),
        bound(last.map(|c| c.open_time_ms)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ExchangeInfoResponse;
    use async_trait::async_trait;
    use rust_decimal::Decimal;

    fn candle(open_time_ms: i64) -> Candle {
        Candle {
            symbol: "ETHUSDT".to_string(),
            interval: Interval::FiveMinutes,
            open_time_ms,
            open: Decimal::new(100, 0),
            high: Decimal::new(101, 0),
            low: Decimal::new(99, 0),
            close: Decimal::new(100, 0),
            volume: Decimal::new(1, 0),
            close_time_ms: open_time_ms + 299_999,
            quote_volume: Decimal::new(100, 0),
            trades: 3,
        }
    }

    struct FixedPage(Vec<Candle>);

    #[async_trait]
    impl ExchangeApi for FixedPage {
        async fn candlesticks(&self, _window: &FetchWindow) -> Result<Vec<Candle>, IngestError> {
            Ok(self.0.clone())
        }

        async fn exchange_info(&self) -> Result<ExchangeInfoResponse, IngestError> {
            Ok(ExchangeInfoResponse { symbols: vec![] })
        }
    }

    #[test]
    fn test_archive_filename() {
        let window = FetchWindow::new("ETHUSDT", Interval::FiveMinutes, Some(1_000), None);
        assert_eq!(archive_filename(&window, None), "candlesticks-ETHUSDT-5m-s-1000-e-.json");

        let last = candle(1_609_459_500_000);
        assert_eq!(
            archive_filename(&window, Some(&last)),
            "candlesticks-ETHUSDT-5m-s-1000-e-1609459500000.json"
        );
    }

    #[tokio::test]
    async fn test_fetch_archives_raw_page() {
        let dir = std::env::temp_dir().join(format!("ingest-fetcher-{}", std::process::id()));
        let page = vec![candle(1_609_459_200_000), candle(1_609_459_500_000)];
        let fetcher = CandlestickFetcher::new(
            Arc::new(FixedPage(page.clone())),
            Some(RawArchive::new(&dir)),
        );

        let fetched = fetcher
            .fetch("ETHUSDT", Interval::FiveMinutes, Some(1_609_459_200_000), None)
            .await
            .unwrap();
        assert_eq!(fetched, page);

        let path = dir.join("candlesticks-ETHUSDT-5m-s-1609459200000-e-1609459500000.json");
        let archived: Vec<Candle> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(archived, page);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_archive_failure_still_returns_page() {
        // A regular file where the archive directory should be.
        let blocker = std::env::temp_dir().join(format!("ingest-fetcher-file-{}", std::process::id()));
        std::fs::write(&blocker, b"").unwrap();
        let fetcher = CandlestickFetcher::new(
            Arc::new(FixedPage(vec![candle(1_609_459_200_000)])),
            Some(RawArchive::new(&blocker)),
        );

        let fetched = fetcher
            .fetch("ETHUSDT", Interval::FiveMinutes, None, None)
            .await
            .unwrap();
        assert_eq!(fetched.len(), 1);
        std::fs::remove_file(&blocker).unwrap();
    }
}

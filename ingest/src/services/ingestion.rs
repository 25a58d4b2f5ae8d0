use shared::{CandleJob, IngestError, Interval};
use std::sync::Arc;
use tracing::{debug, info};

use super::candlestick_fetcher::CandlestickFetcher;
use super::candlestick_store::CandlestickStore;
use super::date_normalizer;
use crate::clock::Clock;
use crate::queue::JobQueue;
use crate::repositories::SymbolRepository;

/// Symbol argument that expands to every stored exchange symbol.
pub const ALL_SYMBOLS: &str = "ALL";

pub const DEFAULT_SYMBOL_CHUNK_SIZE: usize = 65;

/// One `candlesticks` invocation as the user typed it.
#[derive(Debug, Clone, Default)]
pub struct IngestRequest {
    pub symbols: Vec<String>,
    pub interval: String,
    pub from: Option<String>,
    pub to: Option<String>,
    /// 0-based slice of the `ALL` roster
    pub chunk: Option<usize>,
    pub use_queue: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Rows written inline, summed over every page
    Stored(usize),
    /// Jobs handed to the queue
    Dispatched(usize),
}

/// Drives fetch and store across symbols, paginating each symbol's range until exhausted.
pub struct IngestionService {
    fetcher: CandlestickFetcher,
    store: CandlestickStore,
    symbols: Arc<dyn SymbolRepository>,
    clock: Arc<dyn Clock>,
    queue: Option<Arc<dyn JobQueue>>,
    symbol_chunk_size: usize,
}

impl IngestionService {
    pub fn new(
        fetcher: CandlestickFetcher,
        store: CandlestickStore,
        symbols: Arc<dyn SymbolRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            fetcher,
            store,
            symbols,
            clock,
            queue: None,
            symbol_chunk_size: DEFAULT_SYMBOL_CHUNK_SIZE,
        }
    }

    pub fn with_queue(mut self, queue: Arc<dyn JobQueue>) -> Self {
        self.queue = Some(queue);
        self
    }

    pub fn with_symbol_chunk_size(mut self, size: usize) -> Self {
        self.symbol_chunk_size = size.max(1);
        self
    }

    /// Validates the request, then either ingests inline or fans out one job per symbol.
    ///
    /// Interval and date checks happen before any exchange call, so a bad request
    /// fetches and writes nothing.
    pub async fn run(&self, request: &IngestRequest) -> Result<RunOutcome, IngestError> {
        let interval: Interval = request.interval.parse()?;
        if !interval.is_storable() {
            return Err(IngestError::UnsupportedInterval(interval.to_string()));
        }

        let now = self.clock.now();
        let start_ms = date_normalizer::normalize_at(request.from.as_deref(), "from", now)?;
        let end_ms = date_normalizer::normalize_at(request.to.as_deref(), "to", now)?;

        let symbols = self.resolve_symbols(&request.symbols, request.chunk).await?;

        if request.use_queue {
            let count = self.dispatch(&symbols, interval, start_ms, end_ms).await?;
            return Ok(RunOutcome::Dispatched(count));
        }

        let total = self.ingest_symbols(&symbols, interval, start_ms, end_ms).await?;
        Ok(RunOutcome::Stored(total))
    }

    /// Runs a queued job. Its bounds were normalized when it was dispatched.
    pub async fn run_job(&self, job: &CandleJob) -> Result<usize, IngestError> {
        if !job.interval.is_storable() {
            return Err(IngestError::UnsupportedInterval(job.interval.to_string()));
        }
        self.ingest_symbols(&job.symbols, job.interval, job.start_ms, job.end_ms)
            .await
    }

    pub async fn ingest_symbols(
        &self,
        symbols: &[String],
        interval: Interval,
        start_ms: Option<i64>,
        end_ms: Option<i64>,
    ) -> Result<usize, IngestError> {
        let mut total = 0;
        for symbol in symbols {
            total += self.ingest_symbol(symbol, interval, start_ms, end_ms).await?;
        }
        Ok(total)
    }

    async fn ingest_symbol(
        &self,
        symbol: &str,
        interval: Interval,
        start_ms: Option<i64>,
        end_ms: Option<i64>,
    ) -> Result<usize, IngestError> {
        let mut total = 0;
        let mut cursor = start_ms;

        loop {
            let rows = self.fetcher.fetch(symbol, interval, cursor, end_ms).await?;
            let outcome = self.store.store(symbol, interval, &rows).await?;
            total += outcome.stored;

            // The cursor lands on the last open time, so the next page starts with that row again.
            let Some(last) = outcome.last_open_time_ms else {
                break;
            };
            if cursor.is_some_and(|curr| last <= curr) || end_ms.is_some_and(|end| last >= end) {
                break;
            }
            debug!("{} {}: {} rows so far, continuing from {}", symbol, interval, total, last);
            cursor = Some(last);
        }

        info!("{} {}: {} candlesticks stored", symbol, interval, total);
        Ok(total)
    }

    async fn resolve_symbols(
        &self,
        requested: &[String],
        chunk: Option<usize>,
    ) -> Result<Vec<String>, IngestError> {
        let wants_all = requested
            .first()
            .is_some_and(|s| s.trim().eq_ignore_ascii_case(ALL_SYMBOLS));

        if !wants_all {
            return Ok(requested
                .iter()
                .flat_map(|s| s.split(','))
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect());
        }

        let roster = self.symbols.all_symbols().await?;
        let Some(chunk) = chunk else {
            return Ok(roster);
        };

        let selected = roster
            .chunks(self.symbol_chunk_size)
            .nth(chunk)
            .map(|slice| slice.to_vec())
            .unwrap_or_default();
        info!(
            "Chunk {} selects {} of {} symbols",
            chunk,
            selected.len(),
            roster.len()
        );
        Ok(selected)
    }

    async fn dispatch(
        &self,
        symbols: &[String],
        interval: Interval,
        start_ms: Option<i64>,
        end_ms: Option<i64>,
    ) -> Result<usize, IngestError> {
        let queue = self
            .queue
            .as_ref()
            .ok_or_else(|| IngestError::Queue("no job queue configured".to_string()))?;

        for symbol in symbols {
            let job = CandleJob {
                symbols: vec![symbol.clone()],
                interval,
                start_ms,
                end_ms,
            };
            queue.enqueue(&job).await?;
        }
        info!("Dispatched {} {} candlestick jobs", symbols.len(), interval);
        Ok(symbols.len())
    }
}

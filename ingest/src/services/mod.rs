pub mod candlestick_fetcher;
pub mod candlestick_store;
pub mod date_normalizer;
pub mod exchange_info_service;
pub mod ingestion;
pub mod worker;

pub use candlestick_fetcher::CandlestickFetcher;
pub use candlestick_store::{CandlestickStore, StoreOutcome};
pub use exchange_info_service::ExchangeInfoService;
pub use ingestion::{IngestRequest, IngestionService, RunOutcome, ALL_SYMBOLS};
pub use worker::{run_worker, WorkerStats};

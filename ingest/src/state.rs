use sea_orm::DatabaseConnection;
use shared::{get_db_connection, get_redis_client, Config};
use std::sync::Arc;
use std::time::Duration;

use crate::archive::RawArchive;
use crate::clients::{BinanceClient, ExchangeApi};
use crate::clock::SystemClock;
use crate::queue::{JobQueue, RedisJobQueue};
use crate::repositories::{SeaOrmCandleRepository, SeaOrmSymbolRepository, SymbolRepository};
use crate::services::{CandlestickFetcher, CandlestickStore, ExchangeInfoService, IngestionService};

/// Everything a command needs, wired from `Config`.
pub struct AppState {
    pub config: Config,
    pub db: Arc<DatabaseConnection>,
    pub queue: Option<Arc<dyn JobQueue>>,
    pub exchange_info_service: Arc<ExchangeInfoService>,
    pub ingestion_service: Arc<IngestionService>,
}

impl AppState {
    /// Connects to the database, and to Redis when `connect_queue` is set.
    pub async fn new(config: Config, connect_queue: bool) -> Result<Self, anyhow::Error> {
        let db = Arc::new(get_db_connection(&config.database_url).await?);
        tracing::info!("Connected to database successfully");

        let queue: Option<Arc<dyn JobQueue>> = if connect_queue {
            let client = get_redis_client(&config.redis_url)?;
            let queue = RedisJobQueue::connect(&client, &config.candle_queue_key).await?;
            tracing::info!("Using job queue '{}'", config.candle_queue_key);
            Some(Arc::new(queue))
        } else {
            None
        };

        let api: Arc<dyn ExchangeApi> = Arc::new(BinanceClient::new(
            &config.binance_api_url,
            config.klines_limit,
            Duration::from_secs(config.http_timeout_secs),
        )?);
        let archive = config.raw_archive_dir.clone().map(RawArchive::new);
        if let Some(archive) = &archive {
            tracing::info!("Archiving raw payloads under {}", archive.dir().display());
        }

        let symbols: Arc<dyn SymbolRepository> = Arc::new(SeaOrmSymbolRepository::new(db.clone()));
        let clock = Arc::new(SystemClock);

        let exchange_info_service = Arc::new(ExchangeInfoService::new(
            api.clone(),
            symbols.clone(),
            archive.clone(),
        ));

        let mut ingestion_service = IngestionService::new(
            CandlestickFetcher::new(api, archive),
            CandlestickStore::new(Arc::new(SeaOrmCandleRepository::new(db.clone())), clock.clone()),
            symbols,
            clock,
        )
        .with_symbol_chunk_size(config.symbol_chunk_size);
        if let Some(queue) = &queue {
            ingestion_service = ingestion_service.with_queue(queue.clone());
        }

        Ok(AppState {
            config,
            db,
            queue,
            exchange_info_service,
            ingestion_service: Arc::new(ingestion_service),
        })
    }
}

use shared::{ExchangeSymbolInfo, IngestError};
use std::sync::Arc;
use tracing::{info, warn};

use crate::archive::RawArchive;
use crate::clients::ExchangeApi;
use crate::repositories::SymbolRepository;

/// Symbols the exchange lists that are never stored.
pub const EXCLUDED_SYMBOLS: &[&str] = &["123456"];

/// Keeps the `exchange_info` table in step with the exchange's symbol list.
pub struct ExchangeInfoService {
    api: Arc<dyn ExchangeApi>,
    repo: Arc<dyn SymbolRepository>,
    archive: Option<RawArchive>,
}

impl ExchangeInfoService {
    pub fn new(
        api: Arc<dyn ExchangeApi>,
        repo: Arc<dyn SymbolRepository>,
        archive: Option<RawArchive>,
    ) -> Self {
        Self { api, repo, archive }
    }

    /// Fetches exchange metadata and upserts every non-excluded symbol. Returns the count stored.
    pub async fn refresh(&self) -> Result<usize, IngestError> {
        info!("Fetching exchange info");
        let response = self.api.exchange_info().await?;

        if let Some(archive) = &self.archive {
            if let Err(e) = archive.write("exchangeInfo.json", &response).await {
                warn!("Failed to archive exchange info: {}", e);
            }
        }

        let symbols: Vec<ExchangeSymbolInfo> = response
            .symbols
            .iter()
            .filter(|entry| !EXCLUDED_SYMBOLS.contains(&entry.symbol.as_str()))
            .map(|entry| entry.to_symbol_info())
            .collect();

        self.repo.upsert_many(&symbols).await?;
        info!(
            "Stored {} of {} exchange symbols",
            symbols.len(),
            response.symbols.len()
        );
        Ok(symbols.len())
    }

    pub async fn all_symbols(&self) -> Result<Vec<String>, IngestError> {
        self.repo.all_symbols().await
    }

    pub async fn list(&self) -> Result<Vec<ExchangeSymbolInfo>, IngestError> {
        self.repo.list().await
    }
}

pub mod candle_repository;
pub mod exchange_info_repository;

pub use candle_repository::{CandleRepository, SeaOrmCandleRepository};
pub use exchange_info_repository::{SeaOrmSymbolRepository, SymbolRepository};

/// Rows per `INSERT ... ON DUPLICATE KEY UPDATE` statement.
pub(crate) const UPSERT_BATCH_SIZE: usize = 500;

use clap::{Args, Parser, Subcommand};

use crate::services::IngestRequest;

#[derive(Debug, Parser)]
#[command(
    name = "ingest",
    version,
    about = "Fetches exchange candlesticks and symbol metadata into the market data store"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch and store candlesticks for one or more symbols, or ALL
    Candlesticks(CandlesticksArgs),
    /// Refresh the exchange_info table from the exchange
    ExchangeInfo(ExchangeInfoArgs),
    /// Consume queued candlestick jobs
    Work(WorkArgs),
    /// Apply pending database migrations
    Migrate,
}

#[derive(Debug, Args)]
pub struct CandlesticksArgs {
    /// Symbol, comma separated symbols, or ALL
    pub symbol: String,

    /// Exchange interval code
    #[arg(default_value = "1m")]
    pub interval: String,

    /// Range start: epoch seconds/millis or a date within the past year
    #[arg(long)]
    pub from: Option<String>,

    /// Range end, same formats as --from
    #[arg(long)]
    pub to: Option<String>,

    /// With ALL, process only this 0-based slice of the symbol list
    #[arg(long)]
    pub chunk: Option<usize>,

    /// Enqueue one job per symbol instead of fetching inline
    #[arg(long, default_value_t = false)]
    pub queue: bool,
}

impl CandlesticksArgs {
    pub fn to_request(&self) -> IngestRequest {
        IngestRequest {
            symbols: vec![self.symbol.clone()],
            interval: self.interval.clone(),
            from: self.from.clone(),
            to: self.to.clone(),
            chunk: self.chunk,
            use_queue: self.queue,
        }
    }
}

#[derive(Debug, Args)]
pub struct ExchangeInfoArgs {
    /// Print the stored symbols after refreshing
    #[arg(long, default_value_t = false)]
    pub list: bool,
}

#[derive(Debug, Args)]
pub struct WorkArgs {
    /// Exit once the queue is empty
    #[arg(long, default_value_t = false)]
    pub once: bool,

    /// Seconds to sleep between polls of an empty queue
    #[arg(long, default_value_t = 5)]
    pub idle_secs: u64,
}

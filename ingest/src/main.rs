use anyhow::Result;
use clap::Parser;
use ingest::cli::{Cli, Command};
use ingest::services::{run_worker, RunOutcome};
use ingest::state::AppState;
use migration::{Migrator, MigratorTrait};
use shared::{get_db_connection, Config};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env()?;

    match cli.command {
        Command::Candlesticks(args) => {
            let state = AppState::new(config, args.queue).await?;
            match state.ingestion_service.run(&args.to_request()).await? {
                RunOutcome::Stored(n) => println!("{} candlesticks fetched & saved", n),
                RunOutcome::Dispatched(n) => println!("{} jobs dispatched", n),
            }
        }
        Command::ExchangeInfo(args) => {
            let state = AppState::new(config, false).await?;
            let count = state.exchange_info_service.refresh().await?;
            println!("{} symbols saved", count);
            if args.list {
                for symbol in state.exchange_info_service.all_symbols().await? {
                    println!("{}", symbol);
                }
            }
        }
        Command::Work(args) => {
            let state = AppState::new(config, true).await?;
            let queue = state
                .queue
                .clone()
                .ok_or_else(|| anyhow::anyhow!("job queue is not connected"))?;
            tracing::info!("Starting worker on '{}'", state.config.candle_queue_key);
            let stats = run_worker(
                &state.ingestion_service,
                queue.as_ref(),
                args.once,
                Duration::from_secs(args.idle_secs),
            )
            .await?;
            println!(
                "{} jobs processed, {} failed, {} candlesticks saved",
                stats.jobs, stats.failed, stats.stored
            );
        }
        Command::Migrate => {
            let db = get_db_connection(&config.database_url).await?;
            Migrator::up(&db, None).await?;
            println!("Migrations applied");
        }
    }

    Ok(())
}

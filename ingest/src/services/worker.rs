use shared::IngestError;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

use super::ingestion::IngestionService;
use crate::queue::JobQueue;

pub const DEFAULT_IDLE_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub jobs: usize,
    pub failed: usize,
    pub stored: usize,
}

/// Pops jobs and runs them inline. A failing job is logged and skipped.
///
/// With `once` set the loop returns as soon as the queue is empty; otherwise it
/// sleeps `idle` between empty polls and never returns on its own.
pub async fn run_worker(
    service: &IngestionService,
    queue: &dyn JobQueue,
    once: bool,
    idle: Duration,
) -> Result<WorkerStats, IngestError> {
    let mut stats = WorkerStats::default();

    loop {
        let job = match queue.dequeue().await {
            Ok(Some(job)) => job,
            Ok(None) if once => break,
            Ok(None) => {
                sleep(idle).await;
                continue;
            }
            Err(IngestError::Decode(e)) => {
                warn!("Dropping malformed job: {}", e);
                stats.failed += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        stats.jobs += 1;
        match service.run_job(&job).await {
            Ok(stored) => {
                stats.stored += stored;
                info!("Job {:?} {} stored {} candlesticks", job.symbols, job.interval, stored);
            }
            Err(e) => {
                stats.failed += 1;
                error!("Job {:?} {} failed: {}", job.symbols, job.interval, e);
            }
        }
    }

    info!(
        "Queue drained: {} jobs, {} failed, {} candlesticks stored",
        stats.jobs, stats.failed, stats.stored
    );
    Ok(stats)
}

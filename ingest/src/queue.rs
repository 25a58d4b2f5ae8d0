//! Work queue for fanning candlestick ingestion out across worker processes.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use shared::{CandleJob, IngestError, Redis};
use tracing::debug;

#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn enqueue(&self, job: &CandleJob) -> Result<(), IngestError>;

    /// Takes the oldest job without waiting. A payload that fails to decode is
    /// consumed and reported as `IngestError::Decode`.
    async fn dequeue(&self) -> Result<Option<CandleJob>, IngestError>;
}

/// Jobs are JSON strings on a Redis list: `LPUSH` to enqueue, `RPOP` to take.
pub struct RedisJobQueue {
    conn: MultiplexedConnection,
    key: String,
}

impl RedisJobQueue {
    pub async fn connect(client: &Redis, key: &str) -> Result<Self, IngestError> {
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Self {
            conn,
            key: key.to_string(),
        })
    }
}

#[async_trait]
impl JobQueue for RedisJobQueue {
    async fn enqueue(&self, job: &CandleJob) -> Result<(), IngestError> {
        let payload = serde_json::to_string(job)?;
        let mut conn = self.conn.clone();
        let _: () = conn.lpush(&self.key, &payload).await?;
        debug!("Queued {} on {}", payload, self.key);
        Ok(())
    }

    async fn dequeue(&self) -> Result<Option<CandleJob>, IngestError> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = conn.rpop(&self.key, None).await?;
        match payload {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }
}

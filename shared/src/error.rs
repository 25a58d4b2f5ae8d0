//! Error taxonomy shared by the ingestion services.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    /// Input is neither a 10/13-digit epoch value nor a recognisable date/time.
    #[error("Invalid '{label}' date/time specified")]
    InvalidDateFormat { label: String },

    /// Parsed value falls outside `(now - 1 year, now]`.
    #[error("'{label}' date/time must be within the past year")]
    OutOfRangeDate { label: String },

    /// Exchange call failed: network, rate limit or malformed response.
    #[error("Remote fetch failed: {0}")]
    RemoteFetchFailure(String),

    #[error("Unsupported interval: {0}")]
    UnsupportedInterval(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Queue error: {0}")]
    Queue(String),

    #[error("Archive error: {0}")]
    Archive(#[from] std::io::Error),

    #[error("Failed to decode payload: {0}")]
    Decode(String),
}

impl IngestError {
    pub fn invalid_date(label: &str) -> Self {
        IngestError::InvalidDateFormat { label: label.to_string() }
    }

    pub fn out_of_range(label: &str) -> Self {
        IngestError::OutOfRangeDate { label: label.to_string() }
    }
}

impl From<reqwest::Error> for IngestError {
    fn from(err: reqwest::Error) -> Self {
        IngestError::RemoteFetchFailure(err.to_string())
    }
}

impl From<::redis::RedisError> for IngestError {
    fn from(err: ::redis::RedisError) -> Self {
        IngestError::Queue(err.to_string())
    }
}

impl From<serde_json::Error> for IngestError {
    fn from(err: serde_json::Error) -> Self {
        IngestError::Decode(err.to_string())
    }
}

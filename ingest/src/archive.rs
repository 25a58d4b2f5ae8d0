//! Optional on-disk archival of raw exchange payloads.
//!
//! Disabled unless `RAW_ARCHIVE_DIR` is set.

use serde::Serialize;
use shared::IngestError;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct RawArchive {
    dir: PathBuf,
}

impl RawArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `payload` as JSON to `<dir>/<filename>`, replacing any previous file.
    pub async fn write<T: Serialize + ?Sized>(
        &self,
        filename: &str,
        payload: &T,
    ) -> Result<PathBuf, IngestError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(filename);
        let body = serde_json::to_vec(payload)?;
        tokio::fs::write(&path, body).await?;
        debug!("Saved raw payload to {}", path.display());
        Ok(path)
    }
}

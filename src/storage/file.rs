//! JSON file backed snapshot store.
//!
//! The document layout is
//!
//! ```json
//! { "last_check": "2025-01-01T12:00:00Z", "apartments": [ ... ] }
//! ```
//!
//! Writes go to a sibling `.tmp` file which is then renamed over the target, so
//! a crash mid-write leaves the previous snapshot in place.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::{error, info};

use crate::error::Result;
use crate::models::Snapshot;
use crate::storage::SnapshotStore;

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<Option<Snapshot>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for JsonFileStore {
    async fn load(&self) -> Snapshot {
        match self.read().await {
            Ok(Some(snapshot)) => {
                info!(
                    "Loaded historical data with {} apartments",
                    snapshot.apartments.len()
                );
                snapshot
            }
            Ok(None) => {
                info!("No historical data file found, starting fresh");
                Snapshot::empty()
            }
            Err(e) => {
                error!("Error loading historical data from {:?}: {}", self.path, e);
                Snapshot::empty()
            }
        }
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(snapshot)?;
        self.write_bytes(&bytes).await?;
        info!(
            "Saved {} apartments to {:?}",
            snapshot.apartments.len(),
            self.path
        );
        Ok(())
    }
}

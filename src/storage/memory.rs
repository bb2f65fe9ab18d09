use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::models::Snapshot;
use crate::storage::SnapshotStore;

/// In-process store, used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: RwLock<Option<Snapshot>>,
    saves: RwLock<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already persisted snapshot.
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            snapshot: RwLock::new(Some(snapshot)),
            saves: RwLock::new(0),
        }
    }

    /// Number of successful `save` calls.
    pub async fn save_count(&self) -> usize {
        *self.saves.read().await
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn load(&self) -> Snapshot {
        self.snapshot.read().await.clone().unwrap_or_default()
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        *self.snapshot.write().await = Some(snapshot.clone());
        *self.saves.write().await += 1;
        Ok(())
    }
}

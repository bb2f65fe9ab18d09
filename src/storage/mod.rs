//! Snapshot persistence.
//!
//! The core only needs two things from a store: the last snapshot written, and
//! a wholesale overwrite with the new one. `load` never fails; anything it
//! cannot read comes back as an empty snapshot, which at worst makes the next
//! diff report every open unit as new.

pub mod file;
pub mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Snapshot;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Last saved snapshot, or [`Snapshot::empty`] if there is none or it is
    /// unreadable.
    async fn load(&self) -> Snapshot;

    /// Replace the stored snapshot.
    async fn save(&self, snapshot: &Snapshot) -> Result<()>;
}

//! Durable storage of per-seed entity snapshots and of the live session.

pub mod jsonl;
pub mod memory;

pub use jsonl::JsonlStore;
pub use memory::MemoryStore;

use serde::{Deserialize, Serialize};

use crate::engine::EntityRecord;
use crate::error::Result;

/// What the host's own save holds between sessions: the seed that was
/// active and the entities that were live in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveState {
    pub seed: String,
    pub entities: Vec<EntityRecord>,
}

pub trait SnapshotStore {
    /// Fails with `SnapshotMissing` if nothing was ever saved for `seed`.
    fn load_snapshot(&self, seed: &str) -> Result<Vec<EntityRecord>>;

    /// Replace the snapshot of `seed`.
    fn save_snapshot(&mut self, seed: &str, records: &[EntityRecord]) -> Result<()>;

    fn load_live(&self) -> Result<Option<LiveState>>;

    fn save_live(&mut self, state: &LiveState) -> Result<()>;
}

use std::collections::HashMap;

use crate::engine::EntityRecord;
use crate::error::{Result, WarpError};

use super::{LiveState, SnapshotStore};

/// Store that keeps everything in memory. Used by tests and short sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    snapshots: HashMap<String, Vec<EntityRecord>>,
    live: Option<LiveState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_snapshot(&self, seed: &str) -> bool {
        self.snapshots.contains_key(seed)
    }
}

impl SnapshotStore for MemoryStore {
    fn load_snapshot(&self, seed: &str) -> Result<Vec<EntityRecord>> {
        self.snapshots
            .get(seed)
            .cloned()
            .ok_or_else(|| WarpError::SnapshotMissing(seed.to_string()))
    }

    fn save_snapshot(&mut self, seed: &str, records: &[EntityRecord]) -> Result<()> {
        self.snapshots.insert(seed.to_string(), records.to_vec());
        Ok(())
    }

    fn load_live(&self) -> Result<Option<LiveState>> {
        Ok(self.live.clone())
    }

    fn save_live(&mut self, state: &LiveState) -> Result<()> {
        self.live = Some(state.clone());
        Ok(())
    }
}

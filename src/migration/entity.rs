use crate::engine::EntityRecord;
use crate::id::{EntityId, InstanceKey};

/// Where a tracked entity currently is. Untracked ids are simply absent
/// from the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityState {
    /// Known to belong to a seed but not spawned this session.
    Registered,
    Spawned(InstanceKey),
    /// Unloaded into its seed's snapshot.
    Despawned,
}

/// Index entry of one persistent entity.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistentEntity {
    pub id: EntityId,
    /// Seed that owns the entity.
    pub seed: String,
    /// Last captured record.
    pub record: EntityRecord,
    pub state: EntityState,
}

impl PersistentEntity {
    pub fn instance(&self) -> Option<InstanceKey> {
        match self.state {
            EntityState::Spawned(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn is_spawned(&self) -> bool {
        self.instance().is_some()
    }
}

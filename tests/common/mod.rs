#![allow(dead_code)]

use warp_systems::scenario::stock_home_system;
use warp_systems::{EcsHost, Engine, EntityId, SnapshotStore, WarpConfig, WarpDrive};

/// Stock home system with one plain vessel per id.
pub fn home_with_vessels(ids: &[EntityId]) -> EcsHost {
    let mut host = stock_home_system();
    for &id in ids {
        host.launch(id, &format!("Vessel {id}")).unwrap();
    }
    host
}

pub fn drive<S: SnapshotStore>(ids: &[EntityId], store: S) -> WarpDrive<EcsHost, S> {
    WarpDrive::new(home_with_vessels(ids), store, WarpConfig::default()).unwrap()
}

/// Live entity ids, sorted.
pub fn live_ids(engine: &dyn Engine) -> Vec<EntityId> {
    let mut ids: Vec<EntityId> = engine.live_entities().iter().map(|e| e.id).collect();
    ids.sort_unstable();
    ids
}

pub fn has_duplicates(engine: &dyn Engine) -> bool {
    let ids = live_ids(engine);
    ids.windows(2).any(|w| w[0] == w[1])
}

use std::collections::{BTreeMap, BTreeSet};

use crate::engine::{EntityRecord, Engine, LiveEntity};
use crate::error::{Result, WarpError};
use crate::id::{EntityId, InstanceKey};
use crate::store::SnapshotStore;

use super::entity::{EntityState, PersistentEntity};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub seed: String,
    /// Records written to the seed's snapshot.
    pub saved: usize,
    pub despawned: Vec<EntityId>,
    /// Still live because the host refused to unload them.
    pub refused: Vec<EntityId>,
    pub kept: Option<EntityId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulateReport {
    pub seed: String,
    /// No snapshot existed: the seed started empty.
    pub first_visit: bool,
    pub spawned: Vec<EntityId>,
    pub skipped: Vec<EntityId>,
    pub duplicates_removed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub entity: EntityId,
    pub from: String,
    pub to: String,
    pub flush: FlushReport,
    pub populate: PopulateReport,
}

/// Tracks which seed owns every persistent entity and moves entities between
/// the host's live collection and per-seed snapshots.
///
/// At most one live copy of an entity id exists at any time: populate skips
/// ids that are already live, and a sweep after every populate unloads any
/// extra copies the host ended up with.
#[derive(Debug, Default)]
pub struct MigrationManager {
    entities: BTreeMap<EntityId, PersistentEntity>,
    /// Per seed: entity id -> live instance.
    spawned: BTreeMap<String, BTreeMap<EntityId, InstanceKey>>,
}

impl MigrationManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entity(&self, id: EntityId) -> Option<&PersistentEntity> {
        self.entities.get(&id)
    }

    pub fn seed_of(&self, id: EntityId) -> Option<&str> {
        self.entities.get(&id).map(|e| e.seed.as_str())
    }

    /// Ids spawned for `seed`, ascending.
    pub fn spawned_in(&self, seed: &str) -> Vec<EntityId> {
        self.spawned
            .get(seed)
            .map(|m| m.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Track every live instance as owned by `seed`. For a live collection
    /// that `populate` did not produce, such as the one a session starts with.
    pub fn adopt_live(&mut self, seed: &str, engine: &dyn Engine) -> Result<usize> {
        let mut adopted = 0;
        for entry in engine.live_entities() {
            let tracked = self.entities.get(&entry.id);
            if tracked.is_some_and(|e| e.seed == seed && e.instance() == Some(entry.instance)) {
                continue;
            }
            let record = engine.capture_entity(entry.instance)?;
            self.set(seed, record, EntityState::Spawned(entry.instance));
            adopted += 1;
        }
        Ok(adopted)
    }

    /// Snapshot every live entity of `seed`, then unload them all except
    /// `except`. The snapshot is written before anything is unloaded; if it
    /// fails, nothing is unloaded. Refused unloads are logged and the entity
    /// stays live.
    pub fn flush(
        &mut self,
        seed: &str,
        except: Option<EntityId>,
        engine: &mut dyn Engine,
        store: &mut dyn SnapshotStore,
    ) -> Result<FlushReport> {
        let live = engine.live_entities();
        let kept = except.and_then(|id| preferred_instance(&live, id));

        let mut records = Vec::new();
        let mut seen = BTreeSet::new();
        for entry in &live {
            // Extra copies of the exempt entity are unloaded but never saved.
            if Some(entry.id) == except {
                continue;
            }
            if !seen.insert(entry.id) {
                tracing::warn!(seed, entity = entry.id, "duplicate live copy left out of snapshot");
                continue;
            }
            let record = engine.capture_entity(entry.instance)?;
            self.set(seed, record.clone(), EntityState::Spawned(entry.instance));
            records.push(record);
        }
        store.save_snapshot(seed, &records)?;

        let mut report = FlushReport {
            seed: seed.to_string(),
            saved: records.len(),
            kept: except.filter(|_| kept.is_some()),
            ..FlushReport::default()
        };
        for entry in &live {
            if Some(entry.instance) == kept {
                continue;
            }
            match engine.unload_entity(entry.instance) {
                Ok(()) => {
                    self.mark_despawned(entry.id, entry.instance);
                    if !report.despawned.contains(&entry.id) {
                        report.despawned.push(entry.id);
                    }
                }
                Err(err) => {
                    tracing::error!(seed, entity = entry.id, %err, "entity kept live, unload failed");
                    report.refused.push(entry.id);
                }
            }
        }

        tracing::info!(
            seed,
            saved = report.saved,
            despawned = report.despawned.len(),
            refused = report.refused.len(),
            "seed flushed"
        );
        Ok(report)
    }

    /// Spawn the entities of `seed`'s snapshot. A missing snapshot means a
    /// first visit and an empty seed. Entries already live, or owned by
    /// another seed, are skipped.
    pub fn populate(
        &mut self,
        seed: &str,
        engine: &mut dyn Engine,
        store: &mut dyn SnapshotStore,
    ) -> Result<PopulateReport> {
        let mut report = PopulateReport {
            seed: seed.to_string(),
            ..PopulateReport::default()
        };
        let records = match store.load_snapshot(seed) {
            Ok(records) => records,
            Err(WarpError::SnapshotMissing(_)) => {
                tracing::warn!(seed, "no snapshot stored, starting with no entities");
                report.first_visit = true;
                Vec::new()
            }
            Err(err) => return Err(err),
        };

        let mut live: BTreeSet<EntityId> = engine.live_entities().iter().map(|e| e.id).collect();
        for record in records {
            let id = record.id;
            if live.contains(&id) {
                let err = WarpError::DuplicateEntity(id);
                tracing::warn!(seed, entity = id, %err, "snapshot copy skipped");
                report.skipped.push(id);
                continue;
            }
            if let Some(owner) = self.seed_of(id).filter(|owner| *owner != seed) {
                tracing::warn!(seed, entity = id, owner, "stale snapshot entry belongs to another seed");
                report.skipped.push(id);
                continue;
            }
            self.set(seed, record.clone(), EntityState::Registered);
            let instance = engine.load_entity(&record)?;
            self.set(seed, record, EntityState::Spawned(instance));
            live.insert(id);
            report.spawned.push(id);
        }
        report.duplicates_removed = self.ensure_unique(engine);

        tracing::info!(
            seed,
            spawned = report.spawned.len(),
            skipped = report.skipped.len(),
            first_visit = report.first_visit,
            "seed populated"
        );
        Ok(report)
    }

    /// Move one live entity from `from` to `to` while the rest of `from` is
    /// flushed and `to` is populated around it.
    pub fn migrate_single(
        &mut self,
        id: EntityId,
        from: &str,
        to: &str,
        engine: &mut dyn Engine,
        store: &mut dyn SnapshotStore,
    ) -> Result<MigrationReport> {
        if preferred_instance(&engine.live_entities(), id).is_none() {
            return Err(WarpError::EntityNotLive(id));
        }
        let flush = self.flush(from, Some(id), engine, store)?;
        let populate = self.populate(to, engine, store)?;

        let instance =
            preferred_instance(&engine.live_entities(), id).ok_or(WarpError::EntityNotLive(id))?;
        let record = engine.capture_entity(instance)?;
        self.set(to, record, EntityState::Spawned(instance));

        tracing::info!(
            entity = id,
            from,
            to,
            saved = flush.saved,
            spawned = populate.spawned.len(),
            "entity migrated"
        );
        Ok(MigrationReport {
            entity: id,
            from: from.to_string(),
            to: to.to_string(),
            flush,
            populate,
        })
    }

    /// Undo a flush of `from` and a partial populate of `to`: unload what was
    /// spawned for `to` (its snapshot still holds it) and respawn `from`.
    pub fn rollback(
        &mut self,
        from: &str,
        to: &str,
        engine: &mut dyn Engine,
        store: &mut dyn SnapshotStore,
    ) -> Result<()> {
        let spawned = self.spawned.get(to).cloned().unwrap_or_default();
        for (id, instance) in spawned {
            match engine.unload_entity(instance) {
                Ok(()) => self.mark_despawned(id, instance),
                Err(err) => tracing::error!(seed = to, entity = id, %err, "could not unload during rollback"),
            }
        }
        self.populate(from, engine, store)?;
        tracing::info!(from, to, "entity migration rolled back");
        Ok(())
    }

    /// Unload every live copy of an id past the first. The newer copy goes
    /// first; if the host refuses, the older one is tried instead.
    fn ensure_unique(&mut self, engine: &mut dyn Engine) -> usize {
        let mut first: BTreeMap<EntityId, InstanceKey> = BTreeMap::new();
        let mut removed = 0;
        for entry in engine.live_entities() {
            let Some(&older) = first.get(&entry.id) else {
                first.insert(entry.id, entry.instance);
                continue;
            };
            tracing::warn!(entity = entry.id, "entity has more than one live copy");
            match engine.unload_entity(entry.instance) {
                Ok(()) => {
                    removed += 1;
                    self.mark_despawned(entry.id, entry.instance);
                }
                Err(newer_err) => match engine.unload_entity(older) {
                    Ok(()) => {
                        removed += 1;
                        first.insert(entry.id, entry.instance);
                        self.repoint(entry.id, older, entry.instance);
                    }
                    Err(older_err) => {
                        tracing::error!(
                            entity = entry.id,
                            %newer_err,
                            %older_err,
                            "could not remove duplicate live copy"
                        );
                    }
                },
            }
        }
        removed
    }

    fn set(&mut self, seed: &str, record: EntityRecord, state: EntityState) {
        let id = record.id;
        if let Some(previous) = self.entities.get(&id) {
            if let Some(index) = self.spawned.get_mut(&previous.seed) {
                index.remove(&id);
            }
        }
        if let EntityState::Spawned(instance) = state {
            self.spawned.entry(seed.to_string()).or_default().insert(id, instance);
        }
        self.entities.insert(
            id,
            PersistentEntity {
                id,
                seed: seed.to_string(),
                record,
                state,
            },
        );
    }

    fn mark_despawned(&mut self, id: EntityId, instance: InstanceKey) {
        let Some(entity) = self.entities.get_mut(&id) else {
            return;
        };
        if entity.instance() != Some(instance) {
            return;
        }
        entity.state = EntityState::Despawned;
        if let Some(index) = self.spawned.get_mut(&entity.seed) {
            index.remove(&id);
        }
    }

    fn repoint(&mut self, id: EntityId, from: InstanceKey, to: InstanceKey) {
        let Some(entity) = self.entities.get_mut(&id) else {
            return;
        };
        if entity.instance() != Some(from) {
            return;
        }
        entity.state = EntityState::Spawned(to);
        if let Some(index) = self.spawned.get_mut(&entity.seed) {
            index.insert(id, to);
        }
    }
}

/// The active copy of `id` if there is one, else its oldest copy.
fn preferred_instance(live: &[LiveEntity], id: EntityId) -> Option<InstanceKey> {
    let mut copies = live.iter().filter(|e| e.id == id);
    let first = copies.next()?;
    Some(
        std::iter::once(first)
            .chain(copies)
            .find(|e| e.active)
            .unwrap_or(first)
            .instance,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::EcsHost;
    use crate::store::MemoryStore;

    fn host_with(ids: &[EntityId]) -> EcsHost {
        let mut host = EcsHost::new();
        for &id in ids {
            host.launch(id, &format!("Vessel {id}")).unwrap();
        }
        host
    }

    fn live_ids(host: &EcsHost) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = host.live_entities().iter().map(|e| e.id).collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn flush_then_populate_restores_the_same_ids() {
        let mut host = host_with(&[1, 2, 3]);
        let mut store = MemoryStore::new();
        let mut manager = MigrationManager::new();

        let flush = manager.flush("Alpha", None, &mut host, &mut store).unwrap();
        assert_eq!(flush.saved, 3);
        assert!(host.live_entities().is_empty());
        assert!(manager.spawned_in("Alpha").is_empty());
        assert_eq!(manager.entity(2).unwrap().state, EntityState::Despawned);

        let populate = manager.populate("Alpha", &mut host, &mut store).unwrap();
        assert!(!populate.first_visit);
        assert_eq!(live_ids(&host), vec![1, 2, 3]);
        assert_eq!(manager.spawned_in("Alpha"), vec![1, 2, 3]);
    }

    #[test]
    fn missing_snapshot_is_a_first_visit() {
        let mut host = EcsHost::new();
        let mut store = MemoryStore::new();
        let mut manager = MigrationManager::new();
        let report = manager.populate("Fresh", &mut host, &mut store).unwrap();
        assert!(report.first_visit);
        assert!(report.spawned.is_empty());
    }

    #[test]
    fn refused_unload_keeps_entity_live() {
        let mut host = host_with(&[1, 2]);
        let active = host.live_entities()[1].instance;
        host.set_active(Some(active)).unwrap();
        let mut store = MemoryStore::new();
        let mut manager = MigrationManager::new();

        let report = manager.flush("Alpha", None, &mut host, &mut store).unwrap();
        assert_eq!(report.refused, vec![2]);
        assert_eq!(report.despawned, vec![1]);
        assert_eq!(live_ids(&host), vec![2]);
        // Saved as well, so it is not lost either way.
        assert_eq!(store.load_snapshot("Alpha").unwrap().len(), 2);
        assert!(manager.entity(2).unwrap().is_spawned());
    }

    #[test]
    fn populate_skips_ids_already_live() {
        let mut host = host_with(&[1]);
        let mut store = MemoryStore::new();
        store
            .save_snapshot(
                "Alpha",
                &[
                    EntityRecord { id: 1, name: "Copy".into(), data: serde_json::Value::Null },
                    EntityRecord { id: 2, name: "Other".into(), data: serde_json::Value::Null },
                ],
            )
            .unwrap();
        let mut manager = MigrationManager::new();
        let report = manager.populate("Alpha", &mut host, &mut store).unwrap();
        assert_eq!(report.skipped, vec![1]);
        assert_eq!(report.spawned, vec![2]);
        assert_eq!(host.copies_of(1), 1);
    }

    #[test]
    fn sweep_removes_extra_copies() {
        let mut host = host_with(&[5, 5, 6]);
        let mut store = MemoryStore::new();
        store.save_snapshot("Alpha", &[]).unwrap();
        let mut manager = MigrationManager::new();
        let report = manager.populate("Alpha", &mut host, &mut store).unwrap();
        assert_eq!(report.duplicates_removed, 1);
        assert_eq!(host.copies_of(5), 1);
    }

    #[test]
    fn sweep_falls_back_to_the_older_copy() {
        let mut host = host_with(&[5, 5]);
        let newer = host.live_entities()[1].instance;
        host.set_loaded(newer, true).unwrap();
        let mut store = MemoryStore::new();
        store.save_snapshot("Alpha", &[]).unwrap();
        let mut manager = MigrationManager::new();
        manager.adopt_live("Alpha", &host).unwrap();

        let report = manager.populate("Alpha", &mut host, &mut store).unwrap();
        assert_eq!(report.duplicates_removed, 1);
        let live = host.live_entities();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].instance, newer);
        assert_eq!(manager.entity(5).unwrap().instance(), Some(newer));
    }

    #[test]
    fn migrate_single_carries_one_entity() {
        let mut host = host_with(&[1, 2, 9]);
        let traveller = host.live_entities()[2].instance;
        host.set_active(Some(traveller)).unwrap();
        let mut store = MemoryStore::new();
        let mut manager = MigrationManager::new();
        manager.adopt_live("Home", &host).unwrap();

        let report = manager.migrate_single(9, "Home", "Alpha", &mut host, &mut store).unwrap();
        assert_eq!(report.flush.kept, Some(9));
        assert_eq!(live_ids(&host), vec![9]);
        assert_eq!(manager.seed_of(9), Some("Alpha"));
        assert_eq!(manager.spawned_in("Alpha"), vec![9]);
        assert!(manager.spawned_in("Home").is_empty());
        let home: Vec<EntityId> = store.load_snapshot("Home").unwrap().iter().map(|r| r.id).collect();
        assert_eq!(home, vec![1, 2]);
    }

    #[test]
    fn repopulating_the_target_keeps_one_copy() {
        let mut host = host_with(&[1, 9]);
        let traveller = host.live_entities()[1].instance;
        host.set_active(Some(traveller)).unwrap();
        let mut store = MemoryStore::new();
        store
            .save_snapshot(
                "B",
                &[
                    EntityRecord { id: 9, name: "Old copy".into(), data: serde_json::Value::Null },
                    EntityRecord { id: 4, name: "Resident".into(), data: serde_json::Value::Null },
                ],
            )
            .unwrap();
        let mut manager = MigrationManager::new();
        manager.adopt_live("A", &host).unwrap();

        let report = manager.migrate_single(9, "A", "B", &mut host, &mut store).unwrap();
        assert_eq!(report.populate.skipped, vec![9]);
        manager.populate("B", &mut host, &mut store).unwrap();

        assert_eq!(host.copies_of(9), 1);
        assert_eq!(host.copies_of(4), 1);
        assert_eq!(live_ids(&host), vec![4, 9]);
        assert_eq!(manager.seed_of(9), Some("B"));
        assert_eq!(manager.entity(9).unwrap().instance(), Some(traveller));
        assert_eq!(manager.spawned_in("B"), vec![4, 9]);
    }

    #[test]
    fn rollback_restores_the_flushed_seed() {
        let mut host = host_with(&[1, 2]);
        let mut store = MemoryStore::new();
        store
            .save_snapshot("Alpha", &[EntityRecord { id: 7, name: "Beacon".into(), data: serde_json::Value::Null }])
            .unwrap();
        let mut manager = MigrationManager::new();
        manager.adopt_live("Home", &host).unwrap();
        manager.flush("Home", None, &mut host, &mut store).unwrap();
        manager.populate("Alpha", &mut host, &mut store).unwrap();
        assert_eq!(live_ids(&host), vec![7]);

        manager.rollback("Home", "Alpha", &mut host, &mut store).unwrap();
        assert_eq!(live_ids(&host), vec![1, 2]);
        assert_eq!(manager.entity(7).unwrap().state, EntityState::Despawned);
        assert_eq!(store.load_snapshot("Alpha").unwrap().len(), 1);
    }

    #[test]
    fn migrate_requires_a_live_entity() {
        let mut host = host_with(&[1]);
        let mut store = MemoryStore::new();
        let mut manager = MigrationManager::new();
        let err = manager.migrate_single(4, "Home", "Alpha", &mut host, &mut store).unwrap_err();
        assert!(matches!(err, WarpError::EntityNotLive(4)));
        assert_eq!(live_ids(&host), vec![1]);
    }
}

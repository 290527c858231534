use std::collections::BTreeSet;

use crate::config::WarpConfig;
use crate::engine::Engine;
use crate::error::{Result, WarpError};
use crate::id::EntityId;
use crate::migration::MigrationManager;
use crate::procgen::sanitize_seed;
use crate::store::{LiveState, SnapshotStore};
use crate::system::SystemRegistry;

/// Entry point for the host: switches the active system by seed and moves
/// entities along with it.
pub struct WarpDrive<E: Engine, S: SnapshotStore> {
    engine: E,
    store: S,
    config: WarpConfig,
    registry: SystemRegistry,
    migration: MigrationManager,
    current_seed: String,
}

impl<E: Engine, S: SnapshotStore> WarpDrive<E, S> {
    /// Capture the home system from `engine` and adopt its live entities.
    /// The engine must be showing the home system.
    pub fn new(mut engine: E, store: S, config: WarpConfig) -> Result<Self> {
        let mut registry = SystemRegistry::new(&config);
        registry.get_or_create(&config.home_seed, &mut engine)?;
        let mut migration = MigrationManager::new();
        migration.adopt_live(&config.home_seed, &engine)?;
        Ok(Self {
            current_seed: config.home_seed.clone(),
            engine,
            store,
            config,
            registry,
            migration,
        })
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn registry(&self) -> &SystemRegistry {
        &self.registry
    }

    pub fn migration(&self) -> &MigrationManager {
        &self.migration
    }

    pub fn config(&self) -> &WarpConfig {
        &self.config
    }

    pub fn current_seed(&self) -> &str {
        &self.current_seed
    }

    pub fn system_name(&self) -> Option<&str> {
        self.registry.get(&self.current_seed).map(|s| s.name.as_str())
    }

    pub fn into_parts(self) -> (E, S) {
        (self.engine, self.store)
    }

    /// Switch to the system for `seed`, generating it on first visit. Every
    /// live entity is flushed to the current seed and the target's entities
    /// are spawned. Returns the system's display name.
    pub fn generate_or_activate(&mut self, seed: &str) -> Result<String> {
        let seed = clean_seed(seed)?;
        self.jump(&seed, None)
    }

    /// Like [`generate_or_activate`](Self::generate_or_activate), but the
    /// entity the user controls travels along instead of being flushed.
    pub fn migrate_active_entity(&mut self, seed: &str) -> Result<String> {
        let seed = clean_seed(seed)?;
        let active = self.engine.active_entity().ok_or(WarpError::NoActiveEntity)?;
        self.jump(&seed, Some(active))
    }

    pub fn return_to_home(&mut self) -> Result<String> {
        let home = self.config.home_seed.clone();
        self.jump(&home, None)
    }

    /// Recover the previous session from the live state. Entities missing from
    /// the engine are loaded back; if that session ended away from home they
    /// are flushed to that seed's snapshot and home's entities are spawned.
    /// Returns the seed that was recovered from, if any.
    pub fn resume(&mut self) -> Result<Option<String>> {
        let Some(state) = self.store.load_live()? else {
            return Ok(None);
        };
        let live: BTreeSet<EntityId> = self.engine.live_entities().iter().map(|e| e.id).collect();
        for record in state.entities.iter().filter(|r| !live.contains(&r.id)) {
            self.engine.load_entity(record)?;
        }
        self.migration.adopt_live(&state.seed, &self.engine)?;
        if state.seed == self.config.home_seed {
            return Ok(None);
        }

        tracing::warn!(seed = %state.seed, "last session ended away from home, recovering");
        self.migration
            .flush(&state.seed, None, &mut self.engine, &mut self.store)?;
        self.migration
            .populate(&self.config.home_seed, &mut self.engine, &mut self.store)?;
        self.current_seed = self.config.home_seed.clone();
        self.save_live()?;
        Ok(Some(state.seed))
    }

    fn jump(&mut self, seed: &str, carry: Option<EntityId>) -> Result<String> {
        let previous = self.current_seed.clone();
        let name = self.registry.get_or_create(seed, &mut self.engine)?.name.clone();
        if seed == previous {
            return Ok(name);
        }

        if let Err(err) = self.swap_entities(&previous, seed, carry) {
            tracing::error!(from = %previous, to = seed, %err, "warp failed, restoring previous system");
            self.rollback(&previous, seed);
            return Err(err);
        }
        self.current_seed = seed.to_string();
        self.save_live()?;
        tracing::info!(seed, system = %name, "warp complete");
        Ok(name)
    }

    fn swap_entities(&mut self, from: &str, to: &str, carry: Option<EntityId>) -> Result<()> {
        match carry {
            Some(id) => {
                self.migration
                    .migrate_single(id, from, to, &mut self.engine, &mut self.store)?;
            }
            None => {
                self.migration.flush(from, None, &mut self.engine, &mut self.store)?;
                self.migration.populate(to, &mut self.engine, &mut self.store)?;
            }
        }
        Ok(())
    }

    fn rollback(&mut self, previous: &str, target: &str) {
        if let Err(err) = self.registry.get_or_create(previous, &mut self.engine) {
            tracing::error!(seed = previous, %err, "could not re-apply previous system");
        }
        if let Err(err) = self
            .migration
            .rollback(previous, target, &mut self.engine, &mut self.store)
        {
            tracing::error!(seed = previous, %err, "could not restore previous entities");
        }
    }

    fn save_live(&mut self) -> Result<()> {
        let entities = self
            .engine
            .live_entities()
            .iter()
            .map(|e| self.engine.capture_entity(e.instance))
            .collect::<Result<Vec<_>>>()?;
        self.store.save_live(&LiveState {
            seed: self.current_seed.clone(),
            entities,
        })
    }
}

fn clean_seed(raw: &str) -> Result<String> {
    sanitize_seed(raw).ok_or_else(|| WarpError::InvalidSeed(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::EcsHost;
    use crate::scenario::stock_home_system;
    use crate::store::MemoryStore;

    fn drive_with(ids: &[EntityId]) -> WarpDrive<EcsHost, MemoryStore> {
        let mut host = stock_home_system();
        for &id in ids {
            host.launch(id, &format!("Vessel {id}")).unwrap();
        }
        WarpDrive::new(host, MemoryStore::new(), WarpConfig::default()).unwrap()
    }

    fn live_ids(drive: &WarpDrive<EcsHost, MemoryStore>) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = drive.engine().live_entities().iter().map(|e| e.id).collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn home_entities_wait_in_their_snapshot() {
        let mut drive = drive_with(&[1, 2]);
        drive.generate_or_activate("Alpha").unwrap();
        assert_eq!(drive.current_seed(), "Alpha");
        assert!(live_ids(&drive).is_empty());

        drive.return_to_home().unwrap();
        assert_eq!(drive.current_seed(), "Kerbol");
        assert_eq!(live_ids(&drive), vec![1, 2]);
        assert_eq!(drive.system_name(), Some("Kerbol"));
    }

    #[test]
    fn active_entity_travels() {
        let mut drive = drive_with(&[1, 2]);
        let ship = drive.engine_mut().launch(3, "Ship").unwrap();
        drive.engine_mut().set_active(Some(ship)).unwrap();
        drive.migration.adopt_live("Kerbol", &drive.engine).unwrap();

        drive.migrate_active_entity("Beta").unwrap();
        assert_eq!(live_ids(&drive), vec![3]);
        assert_eq!(drive.migration().seed_of(3), Some("Beta"));

        let live = drive.store().load_live().unwrap().unwrap();
        assert_eq!(live.seed, "Beta");
        assert_eq!(live.entities.len(), 1);
    }

    #[test]
    fn migrating_needs_an_active_entity() {
        let mut drive = drive_with(&[1]);
        let err = drive.migrate_active_entity("Beta").unwrap_err();
        assert!(matches!(err, WarpError::NoActiveEntity));
        assert_eq!(drive.current_seed(), "Kerbol");
    }

    #[test]
    fn unprintable_seed_is_rejected() {
        let mut drive = drive_with(&[]);
        let err = drive.generate_or_activate("\u{7}\u{e9}").unwrap_err();
        assert!(matches!(err, WarpError::InvalidSeed(_)));
        assert_eq!(drive.registry().len(), 1);
    }

    #[test]
    fn same_seed_twice_is_a_no_op() {
        let mut drive = drive_with(&[1]);
        let first = drive.generate_or_activate("Kerbol").unwrap();
        assert_eq!(first, "Kerbol");
        assert_eq!(live_ids(&drive), vec![1]);
        assert!(drive.store().load_live().unwrap().is_none());
    }

    #[test]
    fn resume_recovers_a_session_left_away_from_home() {
        let mut drive = drive_with(&[1]);
        let ship = drive.engine_mut().launch(2, "Ship").unwrap();
        drive.engine_mut().set_active(Some(ship)).unwrap();
        drive.migrate_active_entity("Gamma").unwrap();
        let (_, store) = drive.into_parts();

        // New session: the host is back on its own system with nothing live.
        let mut drive = WarpDrive::new(stock_home_system(), store, WarpConfig::default()).unwrap();
        let recovered = drive.resume().unwrap();
        assert_eq!(recovered.as_deref(), Some("Gamma"));
        assert_eq!(drive.current_seed(), "Kerbol");
        assert_eq!(live_ids(&drive), vec![1]);
        let gamma: Vec<EntityId> =
            drive.store().load_snapshot("Gamma").unwrap().iter().map(|r| r.id).collect();
        assert_eq!(gamma, vec![2]);
    }
}

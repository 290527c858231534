use std::collections::BTreeMap;

use bevy_ecs::entity::Entity;
use bevy_ecs::resource::Resource;

use crate::id::{BodyKey, IdGenerator, InstanceKey};

/// Bidirectional mapping between host keys and Bevy entities.
#[derive(Debug, Clone, Default)]
pub struct KeyMap {
    to_bevy: BTreeMap<u64, Entity>,
    to_key: BTreeMap<Entity, u64>,
}

impl KeyMap {
    pub fn insert(&mut self, key: u64, entity: Entity) {
        if let Some(previous) = self.to_bevy.insert(key, entity) {
            self.to_key.remove(&previous);
        }
        self.to_key.insert(entity, key);
    }

    pub fn get_bevy(&self, key: u64) -> Option<Entity> {
        self.to_bevy.get(&key).copied()
    }

    pub fn get_key(&self, entity: Entity) -> Option<u64> {
        self.to_key.get(&entity).copied()
    }

    pub fn remove(&mut self, key: u64) -> Option<Entity> {
        let entity = self.to_bevy.remove(&key)?;
        self.to_key.remove(&entity);
        Some(entity)
    }

    /// Keys in ascending order, which is also issue order.
    pub fn keys(&self) -> impl Iterator<Item = u64> + '_ {
        self.to_bevy.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.to_bevy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_bevy.is_empty()
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct BodyIndex(pub KeyMap);

#[derive(Resource, Debug, Clone, Default)]
pub struct VesselIndex(pub KeyMap);

/// Issues both body keys and instance keys.
#[derive(Resource, Debug, Default)]
pub struct HostKeys(pub IdGenerator);

/// Universal clock in seconds.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct UniversalTime(pub f64);

/// Body the view is centred on.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct FocusedBody(pub Option<BodyKey>);

/// Instance the user controls.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct ActiveVessel(pub Option<InstanceKey>);

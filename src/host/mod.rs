//! Reference host simulation on a bevy_ecs `World`. Bodies and vessels are
//! entities; keys are mapped to them through index resources.

pub mod components;
pub mod resources;
pub mod spawn;

use bevy_ecs::entity::Entity;
use bevy_ecs::world::World;

use crate::engine::{BodyState, Engine, EntityRecord, LiveEntity};
use crate::error::{Result, WarpError};
use crate::id::{BodyKey, EntityId, InstanceKey};

use components::{Atmosphere, CelestialBody, Loaded, Orbit, Vessel};
use resources::{ActiveVessel, BodyIndex, FocusedBody, HostKeys, UniversalTime, VesselIndex};

pub struct EcsHost {
    world: World,
}

impl Default for EcsHost {
    fn default() -> Self {
        Self::new()
    }
}

impl EcsHost {
    pub fn new() -> Self {
        let mut world = World::new();
        world.insert_resource(BodyIndex::default());
        world.insert_resource(VesselIndex::default());
        world.insert_resource(HostKeys::default());
        world.insert_resource(UniversalTime::default());
        world.insert_resource(FocusedBody::default());
        world.insert_resource(ActiveVessel::default());
        Self { world }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Add a body. Without a parent it becomes the star and references itself;
    /// otherwise it is appended to the parent's children. The first body added
    /// takes the focus.
    pub fn add_body(&mut self, parent: Option<BodyKey>, mut state: BodyState) -> Result<BodyKey> {
        let key = self.world.resource_mut::<HostKeys>().0.next_id();
        match parent {
            None => state.reference = key,
            Some(parent) => {
                let entity = self.body_entity(parent)?;
                let mut body = self
                    .world
                    .get_mut::<CelestialBody>(entity)
                    .ok_or(WarpError::BodyMissing(parent))?;
                body.children.push(key);
                state.reference = parent;
            }
        }
        state.children.clear();
        spawn::spawn_body(&mut self.world, key, &state);
        let mut focus = self.world.resource_mut::<FocusedBody>();
        if focus.0.is_none() {
            focus.0 = Some(key);
        }
        Ok(key)
    }

    pub fn set_focus(&mut self, key: BodyKey) {
        self.world.resource_mut::<FocusedBody>().0 = Some(key);
    }

    pub fn set_universal_time(&mut self, seconds: f64) {
        self.world.resource_mut::<UniversalTime>().0 = seconds;
    }

    pub fn body_key(&self, name: &str) -> Option<BodyKey> {
        let index = self.world.resource::<BodyIndex>();
        index.0.keys().find(|&key| {
            index
                .0
                .get_bevy(key)
                .and_then(|e| self.world.get::<CelestialBody>(e))
                .is_some_and(|b| b.name == name)
        })
    }

    /// Every body's state, in key order.
    pub fn snapshot_bodies(&self) -> Vec<BodyState> {
        let keys: Vec<BodyKey> = self.world.resource::<BodyIndex>().0.keys().collect();
        keys.into_iter().filter_map(|key| self.body(key).ok()).collect()
    }

    /// Spawn a fresh vessel with an empty payload.
    pub fn launch(&mut self, id: EntityId, name: &str) -> Result<InstanceKey> {
        self.load_entity(&EntityRecord {
            id,
            name: name.to_string(),
            data: serde_json::Value::Null,
        })
    }

    /// Hand control to `instance`, loading it. The previous active vessel
    /// stays loaded until [`set_loaded`](Self::set_loaded) releases it.
    pub fn set_active(&mut self, instance: Option<InstanceKey>) -> Result<()> {
        if let Some(instance) = instance {
            self.set_loaded(instance, true)?;
        }
        self.world.resource_mut::<ActiveVessel>().0 = instance;
        Ok(())
    }

    pub fn set_loaded(&mut self, instance: InstanceKey, loaded: bool) -> Result<()> {
        let entity = self.vessel_entity(instance)?;
        let mut vessel = self
            .world
            .get_entity_mut(entity)
            .map_err(|_| WarpError::InstanceMissing(instance))?;
        if loaded {
            vessel.insert(Loaded);
        } else {
            vessel.remove::<Loaded>();
        }
        Ok(())
    }

    /// Live instances of one entity id.
    pub fn copies_of(&self, id: EntityId) -> usize {
        self.live_entities().iter().filter(|e| e.id == id).count()
    }

    fn body_entity(&self, key: BodyKey) -> Result<Entity> {
        self.world
            .resource::<BodyIndex>()
            .0
            .get_bevy(key)
            .ok_or(WarpError::BodyMissing(key))
    }

    fn vessel_entity(&self, instance: InstanceKey) -> Result<Entity> {
        self.world
            .resource::<VesselIndex>()
            .0
            .get_bevy(instance)
            .ok_or(WarpError::InstanceMissing(instance))
    }
}

impl Engine for EcsHost {
    fn main_body(&self) -> BodyKey {
        self.world.resource::<FocusedBody>().0.unwrap_or_default()
    }

    fn body(&self, key: BodyKey) -> Result<BodyState> {
        let entity = self.body_entity(key)?;
        let body = self
            .world
            .get::<CelestialBody>(entity)
            .ok_or(WarpError::BodyMissing(key))?;
        Ok(BodyState {
            name: body.name.clone(),
            reference: body.reference,
            children: body.children.clone(),
            radius: body.radius,
            mass: body.mass,
            grav_parameter: body.grav_parameter,
            sphere_of_influence: body.sphere_of_influence,
            rotation_period: body.rotation_period,
            scaled_size: body.scaled_size,
            atmosphere: self
                .world
                .get::<Atmosphere>(entity)
                .map(|a| a.0.clone())
                .unwrap_or_default(),
            orbit: self.world.get::<Orbit>(entity).map(|o| o.0),
        })
    }

    fn write_body(&mut self, key: BodyKey, state: &BodyState) -> Result<()> {
        let entity = self.body_entity(key)?;
        let mut entity = self
            .world
            .get_entity_mut(entity)
            .map_err(|_| WarpError::BodyMissing(key))?;
        {
            let mut body = entity
                .get_mut::<CelestialBody>()
                .ok_or(WarpError::BodyMissing(key))?;
            body.name.clone_from(&state.name);
            body.reference = state.reference;
            body.children.clone_from(&state.children);
            body.grav_parameter = state.grav_parameter;
            body.sphere_of_influence = state.sphere_of_influence;
            body.rotation_period = state.rotation_period;
            body.scaled_size = state.scaled_size;
        }
        entity.insert(Atmosphere(state.atmosphere.clone()));
        match state.orbit {
            Some(orbit) => {
                entity.insert(Orbit(orbit));
            }
            None => {
                entity.remove::<Orbit>();
            }
        }
        Ok(())
    }

    fn universal_time(&self) -> f64 {
        self.world.resource::<UniversalTime>().0
    }

    fn live_entities(&self) -> Vec<LiveEntity> {
        let index = self.world.resource::<VesselIndex>();
        index
            .0
            .keys()
            .filter_map(|instance| {
                let entity = index.0.get_bevy(instance)?;
                let vessel = self.world.get::<Vessel>(entity)?;
                Some(LiveEntity {
                    instance,
                    id: vessel.id,
                    active: self.world.get::<Loaded>(entity).is_some(),
                })
            })
            .collect()
    }

    fn capture_entity(&self, instance: InstanceKey) -> Result<EntityRecord> {
        let entity = self.vessel_entity(instance)?;
        let vessel = self
            .world
            .get::<Vessel>(entity)
            .ok_or(WarpError::InstanceMissing(instance))?;
        Ok(EntityRecord {
            id: vessel.id,
            name: vessel.name.clone(),
            data: vessel.data.clone(),
        })
    }

    fn load_entity(&mut self, record: &EntityRecord) -> Result<InstanceKey> {
        let instance = self.world.resource_mut::<HostKeys>().0.next_id();
        spawn::spawn_vessel(&mut self.world, instance, record);
        Ok(instance)
    }

    fn unload_entity(&mut self, instance: InstanceKey) -> Result<()> {
        let entity = self.vessel_entity(instance)?;
        if self.world.get::<Loaded>(entity).is_some() {
            let id = self
                .world
                .get::<Vessel>(entity)
                .map(|v| v.id)
                .ok_or(WarpError::InstanceMissing(instance))?;
            return Err(WarpError::DespawnRefused(id));
        }
        self.world.despawn(entity);
        self.world.resource_mut::<VesselIndex>().0.remove(instance);
        Ok(())
    }

    fn active_entity(&self) -> Option<EntityId> {
        let instance = self.world.resource::<ActiveVessel>().0?;
        let entity = self.vessel_entity(instance).ok()?;
        self.world.get::<Vessel>(entity).map(|v| v.id)
    }
}

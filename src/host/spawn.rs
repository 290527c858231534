use bevy_ecs::entity::Entity;
use bevy_ecs::world::World;

use crate::engine::{BodyState, EntityRecord};
use crate::id::{BodyKey, InstanceKey};

use super::components::{Atmosphere, CelestialBody, Orbit, Vessel};
use super::resources::{BodyIndex, VesselIndex};

pub fn spawn_body(world: &mut World, key: BodyKey, state: &BodyState) -> Entity {
    let mut entity = world.spawn((
        CelestialBody {
            key,
            name: state.name.clone(),
            reference: state.reference,
            children: state.children.clone(),
            radius: state.radius,
            mass: state.mass,
            grav_parameter: state.grav_parameter,
            sphere_of_influence: state.sphere_of_influence,
            rotation_period: state.rotation_period,
            scaled_size: state.scaled_size,
        },
        Atmosphere(state.atmosphere.clone()),
    ));
    if let Some(orbit) = state.orbit {
        entity.insert(Orbit(orbit));
    }
    let entity = entity.id();
    if let Some(mut index) = world.get_resource_mut::<BodyIndex>() {
        index.0.insert(key, entity);
    }
    entity
}

pub fn spawn_vessel(world: &mut World, instance: InstanceKey, record: &EntityRecord) -> Entity {
    let entity = world
        .spawn(Vessel {
            instance,
            id: record.id,
            name: record.name.clone(),
            data: record.data.clone(),
        })
        .id();
    if let Some(mut index) = world.get_resource_mut::<VesselIndex>() {
        index.0.insert(instance, entity);
    }
    entity
}

use bevy_ecs::component::Component;

use crate::engine::{AtmosphereState, OrbitElements};
use crate::id::{BodyKey, EntityId, InstanceKey};

/// Core component of every celestial body entity.
#[derive(Component, Debug, Clone)]
pub struct CelestialBody {
    pub key: BodyKey,
    pub name: String,
    pub reference: BodyKey,
    pub children: Vec<BodyKey>,
    pub radius: f64,
    pub mass: f64,
    pub grav_parameter: f64,
    pub sphere_of_influence: f64,
    pub rotation_period: f64,
    pub scaled_size: f64,
}

#[derive(Component, Debug, Clone, Default)]
pub struct Atmosphere(pub AtmosphereState);

/// Absent on the star.
#[derive(Component, Debug, Clone, Copy)]
pub struct Orbit(pub OrbitElements);

/// One live instance of a persistent entity.
#[derive(Component, Debug, Clone)]
pub struct Vessel {
    pub instance: InstanceKey,
    pub id: EntityId,
    pub name: String,
    pub data: serde_json::Value,
}

/// Marker: the vessel is physically loaded and cannot be unloaded.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Loaded;

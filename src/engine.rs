//! Boundary with the host simulation. The host owns every body and vessel
//! object; the core only reads and writes the fields listed here.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::id::{BodyKey, EntityId, InstanceKey};

/// The eight Keplerian elements the host's orbit object carries.
/// Angles in degrees except the mean anomaly, which is in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OrbitElements {
    pub inclination: f64,
    pub eccentricity: f64,
    pub semi_major_axis: f64,
    pub longitude_of_ascending_node: f64,
    pub argument_of_periapsis: f64,
    pub mean_anomaly_at_epoch: f64,
    pub epoch: f64,
    pub period: f64,
}

/// Ambient colour of the lower atmosphere.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Tint {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AtmosphereState {
    pub present: bool,
    pub oxygen: bool,
    pub scale_height_km: f64,
    pub pressure_multiplier: f64,
    pub temperature_multiplier: f64,
    pub ambient: Tint,
}

/// Everything the core reads from or writes to one host body.
/// `radius` and `mass` are read-only: writes leave them untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyState {
    pub name: String,
    /// Body this one orbits. The star references itself.
    pub reference: BodyKey,
    pub children: Vec<BodyKey>,
    pub radius: f64,
    pub mass: f64,
    pub grav_parameter: f64,
    pub sphere_of_influence: f64,
    pub rotation_period: f64,
    /// Size of the body's distant (scaled-space) representation.
    pub scaled_size: f64,
    pub atmosphere: AtmosphereState,
    /// `None` for the star, which has no orbit.
    pub orbit: Option<OrbitElements>,
}

/// Durable form of one persistent entity. The payload is opaque to the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub data: serde_json::Value,
}

/// One entry of the host's live entity collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveEntity {
    pub instance: InstanceKey,
    pub id: EntityId,
    /// Physically loaded/controlled. Active instances refuse to unload.
    pub active: bool,
}

/// The host simulation as seen by the core.
pub trait Engine {
    /// Body the focused view is centred on. Walking its reference chain
    /// upward reaches the star.
    fn main_body(&self) -> BodyKey;

    fn body(&self, key: BodyKey) -> Result<BodyState>;

    /// Write every mutable field of `state` onto the body.
    fn write_body(&mut self, key: BodyKey, state: &BodyState) -> Result<()>;

    /// Universal clock, used as orbit epoch when none is available.
    fn universal_time(&self) -> f64;

    /// Live instances in load order, oldest first.
    fn live_entities(&self) -> Vec<LiveEntity>;

    /// Serialize a live instance into its durable record.
    fn capture_entity(&self, instance: InstanceKey) -> Result<EntityRecord>;

    /// Spawn a record into the live collection. Does not check for duplicates.
    fn load_entity(&mut self, record: &EntityRecord) -> Result<InstanceKey>;

    /// Remove an instance from the live collection without destroying its
    /// record. Fails with `DespawnRefused` while the instance is active.
    fn unload_entity(&mut self, instance: InstanceKey) -> Result<()>;

    /// Entity the user is currently controlling, if any.
    fn active_entity(&self) -> Option<EntityId>;
}

/// Walk the reference chain from the main body up to the body that orbits itself.
pub fn find_star(engine: &dyn Engine) -> Result<BodyKey> {
    const MAX_HOPS: usize = 64;
    let mut current = engine.main_body();
    for _ in 0..MAX_HOPS {
        let body = engine.body(current)?;
        if body.reference == current {
            return Ok(current);
        }
        current = body.reference;
    }
    Err(crate::error::WarpError::BrokenHierarchy(format!(
        "no self-referencing star within {MAX_HOPS} hops of body {}",
        engine.main_body()
    )))
}

use crate::astro;
use crate::engine::BodyState;
use crate::id::BodyId;
use crate::system::GenContext;
use crate::system::body::BodyRecord;

use super::{FacetState, orbit, replace_nan};

/// Surface-level properties that affect no other body.
#[derive(Debug, Clone)]
pub struct GeologyFacet {
    pub state: FacetState,
    pub rotation_period: f64,
    pub scaled_size: f64,
    /// Derived from the cached mass and radius; not written back.
    pub density: f64,
}

impl GeologyFacet {
    pub fn capture(cached: &BodyState) -> Self {
        Self {
            state: FacetState::Uncomputed,
            rotation_period: cached.rotation_period,
            scaled_size: cached.scaled_size,
            density: astro::density(cached.mass, cached.radius),
        }
    }

    pub fn write(&self, out: &mut BodyState) {
        let name = out.name.clone();
        out.rotation_period =
            replace_nan(self.rotation_period, out.rotation_period, &name, "rotation_period");
        out.scaled_size = replace_nan(self.scaled_size, out.scaled_size, &name, "scaled_size");
    }
}

/// Draw the rotation period and size the distant representation by gravity.
/// The star only gets a new rotation.
pub fn randomize(bodies: &mut [BodyRecord], id: BodyId, ctx: &mut GenContext<'_>) {
    if bodies[id].geology.state == FacetState::Computed {
        return;
    }
    orbit::randomize(bodies, id, ctx);

    let config = ctx.config;
    let mut rotation = ctx.rng.next_range(config.rotation_hours_range) * 3600.0;
    if ctx.rng.next_unit() < config.slow_rotator_chance {
        rotation *= config.slow_rotator_multiplier;
    }

    let body = &mut bodies[id];
    body.geology.rotation_period = rotation;
    if !body.is_star() {
        body.geology.scaled_size = body.orbit.gravity_multiplier * config.display_scale_per_gravity;
    }
    body.geology.state = FacetState::Computed;
    tracing::debug!(
        body = %body.general.name,
        rotation_period = rotation,
        scaled_size = body.geology.scaled_size,
        "geology randomized"
    );
}

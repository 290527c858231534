use crate::astro::{self, MAX_SEMI_MAJOR_AXIS};
use crate::engine::{AtmosphereState, BodyState, Tint};
use crate::id::BodyId;
use crate::system::body::BodyRecord;
use crate::system::{GenContext, STAR};

use super::{FacetState, orbit, replace_nan};

#[derive(Debug, Clone)]
pub struct AtmosphereFacet {
    pub state: FacetState,
    pub values: AtmosphereState,
}

impl AtmosphereFacet {
    pub fn capture(cached: &BodyState) -> Self {
        Self {
            state: FacetState::Uncomputed,
            values: cached.atmosphere.clone(),
        }
    }

    /// Altitude where the atmosphere ends, or zero without one.
    pub fn top(&self) -> f64 {
        if self.values.present {
            astro::atmosphere_top(self.values.scale_height_km)
        } else {
            0.0
        }
    }

    pub fn write(&self, out: &mut BodyState) {
        let cached = out.atmosphere.clone();
        let name = out.name.clone();
        let v = &self.values;
        out.atmosphere = AtmosphereState {
            present: v.present,
            oxygen: v.oxygen,
            scale_height_km: replace_nan(v.scale_height_km, cached.scale_height_km, &name, "scale_height_km"),
            pressure_multiplier: replace_nan(
                v.pressure_multiplier,
                cached.pressure_multiplier,
                &name,
                "pressure_multiplier",
            ),
            temperature_multiplier: replace_nan(
                v.temperature_multiplier,
                cached.temperature_multiplier,
                &name,
                "temperature_multiplier",
            ),
            ambient: v.ambient,
        };
    }
}

/// Roll for an atmosphere and derive the temperature multiplier from the
/// body's orbital distance. The star keeps its cached atmosphere.
pub fn randomize(bodies: &mut [BodyRecord], id: BodyId, ctx: &mut GenContext<'_>) {
    if bodies[id].atmosphere.state == FacetState::Computed {
        return;
    }
    if bodies[id].is_star() {
        bodies[id].atmosphere.state = FacetState::Computed;
        return;
    }
    orbit::randomize(bodies, id, ctx);

    let config = ctx.config;
    let orbits_star = bodies[id].reference == STAR;
    let chance = if orbits_star {
        config.planet_atmosphere_chance
    } else {
        config.moon_atmosphere_chance
    };
    let semi_major_axis = bodies[id].semi_major_axis();
    let values = &mut bodies[id].atmosphere.values;

    // Without a hit every field keeps the value captured from the host.
    if ctx.rng.next_unit() < chance {
        values.present = true;
        values.oxygen = ctx.rng.next_unit() < config.oxygen_chance;
        values.scale_height_km = ctx.rng.next_range(config.scale_height_range_km);
        values.pressure_multiplier = ctx.rng.next_range(config.pressure_range);
        values.ambient = Tint {
            r: ctx.rng.next_unit() * config.ambient_tint_max,
            g: ctx.rng.next_unit() * config.ambient_tint_max,
            b: ctx.rng.next_unit() * config.ambient_tint_max,
        };
    }
    values.temperature_multiplier =
        config.temperature_scale * (1.0 - semi_major_axis / MAX_SEMI_MAJOR_AXIS);

    tracing::debug!(
        body = %bodies[id].general.name,
        present = bodies[id].atmosphere.values.present,
        oxygen = bodies[id].atmosphere.values.oxygen,
        scale_height_km = bodies[id].atmosphere.values.scale_height_km,
        pressure = bodies[id].atmosphere.values.pressure_multiplier,
        temperature = bodies[id].atmosphere.values.temperature_multiplier,
        "atmosphere randomized"
    );
    bodies[id].atmosphere.state = FacetState::Computed;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationConfig;
    use crate::procgen::WarpRng;
    use crate::system::test_support::sample_bodies;

    fn run(config: &GenerationConfig, seed: &str) -> Vec<BodyRecord> {
        let mut bodies = sample_bodies();
        for body in &mut bodies {
            body.children.clear();
        }
        let mut rng = WarpRng::new(seed);
        let mut ctx = GenContext { rng: &mut rng, config };
        for id in 0..bodies.len() {
            randomize(&mut bodies, id, &mut ctx);
        }
        bodies
    }

    #[test]
    fn certain_atmosphere_stays_within_ranges() {
        let config = GenerationConfig {
            planet_atmosphere_chance: 1.0,
            moon_atmosphere_chance: 1.0,
            ..GenerationConfig::default()
        };
        let bodies = run(&config, "air");
        for body in bodies.iter().skip(1) {
            let v = &body.atmosphere.values;
            assert!(v.present);
            assert!((0.5..15.0).contains(&v.scale_height_km));
            assert!((0.1..15.0).contains(&v.pressure_multiplier));
            assert!(v.ambient.r < 0.25 && v.ambient.g < 0.25 && v.ambient.b < 0.25);
            assert!(v.temperature_multiplier <= 5.0);
        }
    }

    #[test]
    fn missed_roll_keeps_cached_fields() {
        let config = GenerationConfig {
            planet_atmosphere_chance: 0.0,
            moon_atmosphere_chance: 0.0,
            ..GenerationConfig::default()
        };
        let bodies = run(&config, "vacuum");
        for body in bodies.iter().skip(1) {
            let cached = &body.cached.atmosphere;
            let v = &body.atmosphere.values;
            assert_eq!(v.present, cached.present);
            assert_eq!(v.scale_height_km, cached.scale_height_km);
            assert_eq!(v.pressure_multiplier, cached.pressure_multiplier);
        }
    }

    #[test]
    fn star_is_untouched() {
        let bodies = run(&GenerationConfig::default(), "star");
        assert_eq!(bodies[0].atmosphere.values, bodies[0].cached.atmosphere);
    }
}

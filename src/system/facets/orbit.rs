use std::collections::BTreeSet;
use std::f64::consts::PI;

use crate::astro::{self, ASTRONOMICAL_UNIT, HOME_GRAVITY, HOME_SOI, REFERENCE_MOON_SOI};
use crate::engine::{BodyState, OrbitElements};
use crate::id::BodyId;
use crate::system::body::BodyRecord;
use crate::system::{GenContext, STAR};

use super::{FacetState, replace_nan};

/// Orbit, gravity and sphere of influence of one body.
#[derive(Debug, Clone)]
pub struct OrbitFacet {
    pub state: FacetState,
    pub elements: OrbitElements,
    pub grav_parameter: f64,
    pub sphere_of_influence: f64,
    /// Gravity relative to the home world.
    pub gravity_multiplier: f64,
    pub gas_giant: bool,
}

impl OrbitFacet {
    pub fn capture(cached: &BodyState) -> Self {
        Self {
            state: FacetState::Uncomputed,
            elements: cached.orbit.unwrap_or_default(),
            grav_parameter: cached.grav_parameter,
            sphere_of_influence: cached.sphere_of_influence,
            gravity_multiplier: cached.grav_parameter / HOME_GRAVITY,
            gas_giant: false,
        }
    }

    /// Write gravity, SOI and (for anything but the star) the orbit onto `out`.
    /// `out` starts from the cached state, so NaN physical values fall back
    /// to what the host had.
    pub fn write(&self, out: &mut BodyState, parent: Option<&BodyRecord>, now: f64) {
        let name = out.name.clone();
        out.grav_parameter =
            replace_nan(self.grav_parameter, out.grav_parameter, &name, "grav_parameter");
        out.sphere_of_influence = replace_nan(
            self.sphere_of_influence,
            out.sphere_of_influence,
            &name,
            "sphere_of_influence",
        );
        if let Some(parent) = parent {
            out.orbit = Some(self.sanitized(&name, parent, now));
        }
    }

    fn sanitized(&self, name: &str, parent: &BodyRecord, now: f64) -> OrbitElements {
        let mut e = self.elements;
        let fallback_axis = parent.radius() + parent.atmosphere.top() + 10_000.0;

        e.inclination = replace_nan(e.inclination, 0.0, name, "inclination");
        e.eccentricity = replace_nan(e.eccentricity, 0.0, name, "eccentricity");
        e.semi_major_axis = replace_nan(e.semi_major_axis, fallback_axis, name, "semi_major_axis");
        e.longitude_of_ascending_node =
            replace_nan(e.longitude_of_ascending_node, 0.0, name, "longitude_of_ascending_node");
        e.argument_of_periapsis =
            replace_nan(e.argument_of_periapsis, 0.0, name, "argument_of_periapsis");
        e.mean_anomaly_at_epoch =
            replace_nan(e.mean_anomaly_at_epoch, 0.0, name, "mean_anomaly_at_epoch");
        e.epoch = replace_nan(e.epoch, now, name, "epoch");
        e.period = replace_nan(e.period, astro::orbital_period(e.semi_major_axis), name, "period");

        // Elliptic orbits need a positive axis and hyperbolic ones a negative axis.
        if (e.eccentricity - 1.0).signum() == e.semi_major_axis.signum() {
            e.semi_major_axis = -e.semi_major_axis;
        }
        if e.semi_major_axis >= 0.0 {
            e.mean_anomaly_at_epoch = e.mean_anomaly_at_epoch.rem_euclid(2.0 * PI);
        }
        e
    }
}

/// Randomize the orbit of `id`, computing any candidate parent first.
///
/// A body already computed (or in progress further up the call chain) is
/// left alone, so each orbit is drawn exactly once per system.
pub fn randomize(bodies: &mut [BodyRecord], id: BodyId, ctx: &mut GenContext<'_>) {
    if bodies[id].orbit.state != FacetState::Uncomputed {
        return;
    }
    if bodies[id].is_star() {
        bodies[id].orbit.state = FacetState::Computed;
        return;
    }
    bodies[id].orbit.state = FacetState::InProgress;

    let reference = choose_reference(bodies, id, ctx);
    bodies[id].reference = reference;
    let is_moon = reference != STAR;

    let (multiplier, gas_giant) = draw_gravity(is_moon, ctx);
    let sphere_of_influence = draw_soi(bodies, id, reference, multiplier, is_moon, ctx);
    let inclination = draw_inclination(ctx);
    let eccentricity = damp_eccentricity(ctx.rng.next_unit());

    let mut semi_major_axis = if is_moon {
        place_moon(bodies, id, reference, ctx)
    } else {
        ctx.rng.next_range(ctx.config.planet_sma_range_au) * ASTRONOMICAL_UNIT
    };
    semi_major_axis /= 1.0 - eccentricity;

    let longitude_of_ascending_node = ctx.rng.next_int(0, 360) as f64;
    let argument_of_periapsis = ctx.rng.next_int(0, 360) as f64;
    let mut mean_anomaly_at_epoch = ctx.rng.next_float(0.0, 2.0 * PI);
    if semi_major_axis < 0.0 {
        mean_anomaly_at_epoch = (mean_anomaly_at_epoch / PI - 1.0) * 5.0;
    }

    let body = &mut bodies[id];
    body.orbit.elements = OrbitElements {
        inclination,
        eccentricity,
        semi_major_axis,
        longitude_of_ascending_node,
        argument_of_periapsis,
        mean_anomaly_at_epoch,
        epoch: body.orbit.elements.epoch,
        period: astro::orbital_period(semi_major_axis),
    };
    body.orbit.gravity_multiplier = multiplier;
    body.orbit.grav_parameter = multiplier * HOME_GRAVITY;
    body.orbit.sphere_of_influence = sphere_of_influence;
    body.orbit.gas_giant = gas_giant;
    body.orbit.state = FacetState::Computed;

    tracing::debug!(
        body = %body.general.name,
        reference,
        gravity = multiplier,
        gas_giant,
        soi = sphere_of_influence,
        inclination,
        eccentricity,
        semi_major_axis,
        "orbit randomized"
    );

    if !bodies[reference].children.contains(&id) {
        bodies[reference].children.push(id);
    }
}

/// Pick the star or a star-orbiting body at least as large as `id`.
fn choose_reference(bodies: &mut [BodyRecord], id: BodyId, ctx: &mut GenContext<'_>) -> BodyId {
    let roll = ctx.rng.next_unit();
    let candidates = bodies.len().saturating_sub(1);
    if roll <= ctx.config.solar_orbit_chance || candidates <= 1 {
        return STAR;
    }

    let mut tried = BTreeSet::new();
    for _ in 0..ctx.config.max_reference_attempts {
        let candidate = ctx.rng.next_int(1, bodies.len() as i64) as BodyId;
        if !tried.insert(candidate) {
            continue;
        }
        if accepts_moon(bodies, candidate, id, ctx) {
            return candidate;
        }
        if tried.len() == candidates {
            break;
        }
    }
    STAR
}

fn accepts_moon(
    bodies: &mut [BodyRecord],
    candidate: BodyId,
    moon: BodyId,
    ctx: &mut GenContext<'_>,
) -> bool {
    if candidate == moon || bodies[candidate].orbit.state == FacetState::InProgress {
        return false;
    }
    if bodies[candidate].radius() < bodies[moon].radius() {
        return false;
    }
    randomize(bodies, candidate, ctx);
    bodies[candidate].reference == STAR
}

fn draw_gravity(is_moon: bool, ctx: &mut GenContext<'_>) -> (f64, bool) {
    if is_moon {
        let draw = ctx.rng.next_range(ctx.config.moon_gravity_range);
        return (astro::moon_gravity_from_draw(draw), false);
    }
    let mut multiplier = ctx.rng.next_range(ctx.config.planet_gravity_range);
    let gas_giant = ctx.rng.next_unit() <= ctx.config.gas_giant_chance;
    if gas_giant {
        multiplier *= ctx.config.gas_giant_multiplier;
    }
    (multiplier, gas_giant)
}

fn draw_soi(
    bodies: &mut [BodyRecord],
    id: BodyId,
    parent: BodyId,
    multiplier: f64,
    is_moon: bool,
    ctx: &mut GenContext<'_>,
) -> f64 {
    let radius = bodies[id].radius();
    let soi = match astro::sphere_of_influence(multiplier, is_moon) {
        Some(soi) => soi,
        None => {
            let fallback = if is_moon {
                let jitter = ctx.rng.next_range(ctx.config.moon_soi_jitter_range);
                astro::fallback_soi(radius) + REFERENCE_MOON_SOI * jitter
            } else {
                astro::fallback_soi(radius) + HOME_SOI * multiplier
            };
            tracing::warn!(
                body = %bodies[id].general.name,
                gravity = multiplier,
                fallback,
                "SOI out of range, using radius-based fallback"
            );
            fallback
        }
    };
    let soi = soi.min(HOME_SOI * ctx.config.soi_cap_multiple);
    if is_moon {
        nest_in_parent(bodies, id, parent, soi, ctx)
    } else {
        soi
    }
}

/// Shrink a moon's SOI until the parent's is at least `parent_min_soi_ratio`
/// times larger. If that would put it under the radius floor, the moon keeps
/// the floor and the parent's SOI (and gravity) is raised instead. One pass:
/// raising the parent never loops back into its siblings.
fn nest_in_parent(
    bodies: &mut [BodyRecord],
    id: BodyId,
    parent: BodyId,
    soi: f64,
    ctx: &mut GenContext<'_>,
) -> f64 {
    let config = ctx.config;
    let parent_soi = bodies[parent].sphere_of_influence();
    if soi * config.parent_min_soi_ratio < parent_soi {
        return soi;
    }

    let shared = parent_soi * ctx.rng.next_range(config.moon_soi_share_range);
    let floor = astro::fallback_soi(bodies[id].radius());
    if shared >= floor {
        return shared;
    }

    let mut raised = floor * ctx.rng.next_range(config.parent_soi_ratio_range);
    if raised <= floor * config.parent_min_soi_ratio {
        raised = floor * config.parent_soi_ratio_range.1;
    }
    if raised > parent_soi {
        let parent_body = &mut bodies[parent];
        parent_body.orbit.sphere_of_influence = raised;
        let gravity = HOME_GRAVITY * (raised - astro::fallback_soi(parent_body.radius())) / HOME_SOI;
        if gravity > 0.0 {
            parent_body.orbit.grav_parameter = gravity;
            parent_body.orbit.gravity_multiplier = gravity / HOME_GRAVITY;
        }
        tracing::debug!(
            body = %parent_body.general.name,
            soi = raised,
            "parent SOI raised to contain moon"
        );
    }
    floor
}

fn draw_inclination(ctx: &mut GenContext<'_>) -> f64 {
    let roll = ctx.rng.next_unit();
    match ctx.config.inclination_tiers.iter().find(|tier| roll >= tier.threshold) {
        Some(tier) => ctx.rng.next_int(0, tier.max_degrees) as f64,
        None => 0.0,
    }
}

/// Pull a uniform roll towards circular orbits. Stages cascade: a value
/// damped by one stage is checked again by the next.
pub fn damp_eccentricity(roll: f64) -> f64 {
    let mut e = if roll >= 1.0 { 0.99 } else { roll };
    if e > 0.95 {
        return e * 0.5;
    }
    if e <= 0.25 {
        e -= e * 0.1;
    }
    if e <= 0.5 {
        e -= e * 0.25;
    }
    if e <= 0.8 {
        e *= 0.5;
    } else {
        e *= e;
    }
    e.max(0.0)
}

/// Place a moon at a fraction of the parent's SOI, clear of the parent's
/// surface and atmosphere and of every sibling's band.
fn place_moon(bodies: &[BodyRecord], id: BodyId, parent: BodyId, ctx: &mut GenContext<'_>) -> f64 {
    let parent_body = &bodies[parent];
    let hill = parent_body.sphere_of_influence();
    let radius = bodies[id].radius();
    let floor = radius + parent_body.radius() + parent_body.atmosphere.top();
    let siblings: Vec<(f64, f64)> = parent_body
        .children
        .iter()
        .filter(|&&child| child != id)
        .map(|&child| {
            let sibling = &bodies[child];
            (placement_axis(&sibling.orbit.elements), sibling.radius())
        })
        .collect();

    let mut fraction = ctx.rng.next_unit().max(ctx.config.moon_sma_floor);
    for _ in 0..ctx.config.max_placement_iterations {
        let axis = hill * fraction;
        if axis >= floor && clear_of_siblings(axis, radius, &siblings) {
            return axis;
        }
        fraction += ctx.rng.next_range(ctx.config.moon_sma_step_range);
    }
    tracing::warn!(
        body = %bodies[id].general.name,
        parent = %parent_body.general.name,
        "no clear moon orbit found, keeping last candidate"
    );
    hill * fraction
}

/// Axis a moon was placed at, before eccentricity stretched it.
fn placement_axis(elements: &OrbitElements) -> f64 {
    elements.semi_major_axis * (1.0 - elements.eccentricity)
}

/// `axis ± radius` overlaps no sibling's `(axis, radius)` band.
fn clear_of_siblings(axis: f64, radius: f64, siblings: &[(f64, f64)]) -> bool {
    siblings.iter().all(|&(other, other_radius)| {
        axis + radius < other - other_radius || axis - radius > other + other_radius
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationConfig;
    use crate::procgen::WarpRng;
    use crate::system::test_support::sample_bodies;

    #[test]
    fn damping_cascades() {
        assert_eq!(damp_eccentricity(0.0), 0.0);
        // 0.2 -> 0.18 -> 0.135 -> 0.0675
        assert!((damp_eccentricity(0.2) - 0.0675).abs() < 1e-12);
        // 0.9 skips the first two stages and is squared.
        assert!((damp_eccentricity(0.9) - 0.81).abs() < 1e-12);
        assert!((damp_eccentricity(0.96) - 0.48).abs() < 1e-12);
        assert!((damp_eccentricity(1.0) - 0.495).abs() < 1e-12);
        for i in 0..1000 {
            let e = damp_eccentricity(i as f64 / 1000.0);
            assert!((0.0..1.0).contains(&e), "{e}");
        }
    }

    #[test]
    fn every_body_gets_a_valid_reference() {
        let config = GenerationConfig::default();
        for seed in ["a", "b", "c", "d", "e", "f"] {
            let mut bodies = sample_bodies();
            for body in &mut bodies {
                body.children.clear();
            }
            let mut rng = WarpRng::new(seed);
            let mut ctx = GenContext { rng: &mut rng, config: &config };
            for id in 0..bodies.len() {
                randomize(&mut bodies, id, &mut ctx);
            }
            for body in bodies.iter().skip(1) {
                assert_eq!(body.orbit.state, FacetState::Computed);
                assert_ne!(body.reference, body.id);
                let parent = &bodies[body.reference];
                assert!(parent.is_star() || bodies[parent.reference].is_star());
                assert!(parent.children.contains(&body.id));
                if !parent.is_star() {
                    assert!(parent.radius() >= body.radius());
                    assert!(parent.sphere_of_influence() > 2.0 * body.sphere_of_influence());
                }
            }
        }
    }

    #[test]
    fn sibling_bands_compare_placement_axes() {
        let sibling = OrbitElements {
            eccentricity: 0.5,
            semi_major_axis: 2.0e7,
            ..OrbitElements::default()
        };
        let siblings = [(placement_axis(&sibling), 1.0e5)];
        assert_eq!(siblings[0].0, 1.0e7);
        assert!(!clear_of_siblings(1.0e7, 5.0e4, &siblings));
        assert!(clear_of_siblings(2.0e7, 5.0e4, &siblings));
        assert!(clear_of_siblings(5.0e6, 5.0e4, &siblings));
    }

    #[test]
    fn nan_elements_are_replaced_on_write() {
        let bodies = sample_bodies();
        let star = &bodies[0];
        let mut facet = bodies[1].orbit.clone();
        facet.elements.inclination = f64::NAN;
        facet.elements.semi_major_axis = f64::NAN;
        facet.elements.epoch = f64::NAN;
        facet.grav_parameter = f64::NAN;

        let mut out = bodies[1].cached.clone();
        facet.write(&mut out, Some(star), 42.0);
        let orbit = out.orbit.unwrap();
        assert_eq!(orbit.inclination, 0.0);
        assert_eq!(orbit.epoch, 42.0);
        assert_eq!(orbit.semi_major_axis, star.radius() + star.atmosphere.top() + 10_000.0);
        assert_eq!(out.grav_parameter, bodies[1].cached.grav_parameter);
    }

    #[test]
    fn axis_sign_follows_eccentricity() {
        let bodies = sample_bodies();
        let mut facet = bodies[1].orbit.clone();
        facet.elements.eccentricity = 0.5;
        facet.elements.semi_major_axis = -1.0e9;
        facet.elements.mean_anomaly_at_epoch = 7.0;
        let mut out = bodies[1].cached.clone();
        facet.write(&mut out, Some(&bodies[0]), 0.0);
        let orbit = out.orbit.unwrap();
        assert_eq!(orbit.semi_major_axis, 1.0e9);
        assert!((orbit.mean_anomaly_at_epoch - (7.0 - 2.0 * PI)).abs() < 1e-12);

        facet.elements.eccentricity = 1.5;
        facet.elements.semi_major_axis = 1.0e9;
        facet.write(&mut out, Some(&bodies[0]), 0.0);
        assert_eq!(out.orbit.unwrap().semi_major_axis, -1.0e9);
    }
}

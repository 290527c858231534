//! Astrophysical formulas. Everything here is pure; values are in metres,
//! seconds and kilograms unless a name says "multiplier".
//!
//! Gravity and SOI are expressed relative to the home world, whose stock
//! numbers are the constants below.

use std::f64::consts::PI;

pub const HOME_SOI: f64 = 84_159_286.0;
pub const HOME_MASS: f64 = 5.2915793e22;
pub const HOME_GRAVITY: f64 = 3_531_600_000_000.0;
pub const HOME_RADIUS: f64 = 600_000.0;
pub const HOME_YEAR: f64 = 9_203_545.0;
pub const ASTRONOMICAL_UNIT: f64 = 13_599_840_256.0;
pub const MAX_SEMI_MAJOR_AXIS: f64 = 90_118_820_000.0;
pub const GRAV_CONSTANT: f64 = 6.673e-11;
/// SOI of the home world's large moon; scales fallback moon SOIs.
pub const REFERENCE_MOON_SOI: f64 = 2_429_559.1;

/// Largest raw SOI multiplier the quadratic may produce before it is capped.
const MAX_SOI_MULTIPLIER: f64 = 80.0;
/// Moons whose quadratic SOI exceeds this share of the home SOI are tossed.
const MAX_MOON_SOI_MULTIPLIER: f64 = 0.15;

/// Map a raw draw from the moon gravity range onto a gravity multiplier.
/// Draws below ~7.25 give negative multipliers.
pub fn moon_gravity_from_draw(draw: f64) -> f64 {
    0.0788628 * draw * draw - 0.788279 * draw + 1.58089
}

/// Inverse of the moon skew: lets moons share the planet SOI quadratic.
pub fn moon_unskew(gravity_multiplier: f64) -> f64 {
    (4.0 * (7_925_156_250.0 * gravity_multiplier + 3_082_419_716.0).sqrt() + 499_779.0) / 100_000.0
}

/// SOI multiplier (relative to the home SOI) from the gravity quadratic.
/// May be NaN or negative; callers check with [`sphere_of_influence`].
pub fn soi_multiplier(gravity_multiplier: f64, is_moon: bool) -> f64 {
    let mut g = gravity_multiplier;
    if is_moon {
        g *= moon_unskew(gravity_multiplier);
    }
    // The quadratic dips below zero between its roots (~1.34 and ~2.14).
    if g > 1.25 && g < 2.15 {
        g += 1.0;
    }
    g * (2.59081 * g * g - 9.01415 * g + 7.42334)
}

/// SOI in metres, or `None` when the quadratic is out of its domain
/// (NaN, negative, or implausibly large for a moon). `None` means the
/// radius-based fallback applies.
pub fn sphere_of_influence(gravity_multiplier: f64, is_moon: bool) -> Option<f64> {
    let multiplier = soi_multiplier(gravity_multiplier, is_moon);
    if !multiplier.is_finite() || multiplier < 0.0 {
        return None;
    }
    if is_moon && multiplier > MAX_MOON_SOI_MULTIPLIER {
        return None;
    }
    Some(multiplier.min(MAX_SOI_MULTIPLIER) * HOME_SOI)
}

/// Base of the fallback SOI: one and a half body radii.
pub fn fallback_soi(radius: f64) -> f64 {
    radius * 1.5
}

/// Period in seconds for a semi-major axis, via Kepler's third law on the
/// axis normalised to astronomical units. The square is taken as an absolute
/// value so hyperbolic (negative) axes still give a real period.
pub fn orbital_period(semi_major_axis: f64) -> f64 {
    let normalised = semi_major_axis / ASTRONOMICAL_UNIT * 2.0;
    let period_squared = 4.0 * PI * PI * normalised.powi(3) / GRAV_CONSTANT;
    period_squared.abs().sqrt()
}

/// Height above the surface where the atmosphere ends, for a scale height in km.
pub fn atmosphere_top(scale_height_km: f64) -> f64 {
    scale_height_km * 1000.0 * 1_000_000.0_f64.ln()
}

pub fn volume(radius: f64) -> f64 {
    4.0 / 3.0 * PI * radius.powi(3)
}

pub fn mass(density: f64, radius: f64) -> f64 {
    volume(radius) * density
}

pub fn density(mass: f64, radius: f64) -> f64 {
    mass / volume(radius)
}

pub fn radius(mass: f64, density: f64) -> f64 {
    let volume = mass / density;
    (3.0 * volume / (4.0 * PI)).cbrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() <= tolerance * b.abs().max(1.0)
    }

    #[test]
    fn moon_draw_range_maps_to_small_positive_gravity() {
        let low = moon_gravity_from_draw(7.25);
        let high = moon_gravity_from_draw(9.0);
        assert!(low > 0.0 && low < 0.05, "{low}");
        assert!(high > 0.8 && high < 0.9, "{high}");
    }

    #[test]
    fn unskew_spans_draw_range() {
        assert!(close(moon_unskew(moon_gravity_from_draw(7.25)), 7.25, 1e-2));
        assert!(close(moon_unskew(moon_gravity_from_draw(9.0)), 9.0, 1e-2));
    }

    #[test]
    fn planet_soi_is_positive_across_gravity_range() {
        let mut g = 0.15;
        while g <= 40.0 {
            let soi = sphere_of_influence(g, false).expect("planet soi in domain");
            assert!(soi > 0.0, "g={g} soi={soi}");
            assert!(soi <= MAX_SOI_MULTIPLIER * HOME_SOI);
            g += 0.05;
        }
    }

    #[test]
    fn large_moon_soi_is_tossed() {
        assert!(sphere_of_influence(0.5, true).is_none());
    }

    #[test]
    fn nan_gravity_is_out_of_domain() {
        assert!(sphere_of_influence(f64::NAN, false).is_none());
    }

    #[test]
    fn period_grows_with_axis_and_ignores_sign() {
        let near = orbital_period(ASTRONOMICAL_UNIT);
        let far = orbital_period(2.0 * ASTRONOMICAL_UNIT);
        assert!(far > near);
        assert!(close(far / near, 2.0_f64.powf(1.5), 1e-9));
        assert_eq!(orbital_period(-ASTRONOMICAL_UNIT), near);
        assert!(!orbital_period(-ASTRONOMICAL_UNIT).is_nan());
    }

    #[test]
    fn sphere_conversions_agree() {
        let r = HOME_RADIUS;
        let d = density(HOME_MASS, r);
        assert!(close(mass(d, r), HOME_MASS, 1e-12));
        assert!(close(radius(HOME_MASS, d), r, 1e-9));
    }

    #[test]
    fn atmosphere_top_matches_home_world() {
        // 5 km scale height gives the stock ~69 km atmosphere.
        assert!(close(atmosphere_top(5.0), 69_077.55, 1e-4));
    }
}

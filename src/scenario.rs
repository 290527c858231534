use std::f64::consts::PI;

use crate::astro::{HOME_RADIUS, MAX_SEMI_MAJOR_AXIS};
use crate::engine::{AtmosphereState, BodyState, OrbitElements, Tint};
use crate::host::EcsHost;
use crate::id::BodyKey;

/// Builder-style description of one body for a [`Scenario`].
#[derive(Debug, Clone)]
pub struct BodySpec {
    state: BodyState,
}

impl BodySpec {
    pub fn new(name: &str, radius: f64, mass: f64, grav_parameter: f64) -> Self {
        Self {
            state: BodyState {
                name: name.to_string(),
                reference: 0,
                children: Vec::new(),
                radius,
                mass,
                grav_parameter,
                sphere_of_influence: f64::INFINITY,
                rotation_period: 21_600.0,
                scaled_size: radius / HOME_RADIUS * 0.1,
                atmosphere: AtmosphereState::default(),
                orbit: None,
            },
        }
    }

    pub fn soi(mut self, v: f64) -> Self {
        self.state.sphere_of_influence = v;
        self
    }

    pub fn rotation(mut self, v: f64) -> Self {
        self.state.rotation_period = v;
        self
    }

    pub fn scaled_size(mut self, v: f64) -> Self {
        self.state.scaled_size = v;
        self
    }

    pub fn atmosphere(mut self, scale_height_km: f64, pressure: f64, oxygen: bool) -> Self {
        self.state.atmosphere = AtmosphereState {
            present: true,
            oxygen,
            scale_height_km,
            pressure_multiplier: pressure,
            temperature_multiplier: 1.0,
            ambient: Tint::default(),
        };
        self
    }

    /// Orbit around a parent with gravitational parameter `parent_mu`.
    pub fn orbit(mut self, parent_mu: f64, semi_major_axis: f64, eccentricity: f64, inclination: f64) -> Self {
        self.state.orbit = Some(OrbitElements {
            inclination,
            eccentricity,
            semi_major_axis,
            longitude_of_ascending_node: 0.0,
            argument_of_periapsis: 0.0,
            mean_anomaly_at_epoch: PI,
            epoch: 0.0,
            period: 2.0 * PI * (semi_major_axis.powi(3) / parent_mu).sqrt(),
        });
        if self.state.atmosphere.present {
            self.state.atmosphere.temperature_multiplier = 1.0 - semi_major_axis / MAX_SEMI_MAJOR_AXIS;
        }
        self
    }

    pub fn state(&self) -> &BodyState {
        &self.state
    }
}

/// Test and demo builder over an [`EcsHost`].
pub struct Scenario {
    host: EcsHost,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::new()
    }
}

impl Scenario {
    pub fn new() -> Self {
        Self { host: EcsHost::new() }
    }

    /// Add a body under `parent`, or the star when `parent` is `None`.
    pub fn add(&mut self, parent: Option<BodyKey>, spec: BodySpec) -> BodyKey {
        self.host
            .add_body(parent, spec.state)
            .expect("scenario parent must be added first")
    }

    pub fn focus(&mut self, key: BodyKey) -> &mut Self {
        self.host.set_focus(key);
        self
    }

    pub fn host_mut(&mut self) -> &mut EcsHost {
        &mut self.host
    }

    pub fn build(self) -> EcsHost {
        self.host
    }
}

const SUN_MU: f64 = 1.172_332_8e18;
const KERBIN_MU: f64 = 3.531_6e12;
const EVE_MU: f64 = 8.171_730_2e12;
const DUNA_MU: f64 = 3.013_632_1e11;
const JOOL_MU: f64 = 2.825_28e14;

/// The stock home system: the Sun, seven planets and their nine moons,
/// focused on Kerbin.
pub fn stock_home_system() -> EcsHost {
    let mut s = Scenario::new();
    let sun = s.add(
        None,
        BodySpec::new("Sun", 261_600_000.0, 1.756_545_9e28, SUN_MU).rotation(432_000.0).scaled_size(1.0),
    );

    s.add(
        Some(sun),
        BodySpec::new("Moho", 250_000.0, 2.526_331_4e21, 1.686_093_8e11)
            .soi(9_646_663.0)
            .rotation(1_210_000.0)
            .orbit(SUN_MU, 5_263_138_304.0, 0.2, 7.0),
    );
    let eve = s.add(
        Some(sun),
        BodySpec::new("Eve", 700_000.0, 1.224_398e23, EVE_MU)
            .soi(85_109_365.0)
            .rotation(80_500.0)
            .atmosphere(7.0, 5.0, false)
            .orbit(SUN_MU, 9_832_684_544.0, 0.01, 2.1),
    );
    s.add(
        Some(eve),
        BodySpec::new("Gilly", 13_000.0, 1.242_036_3e17, 8_289_449.8)
            .soi(126_123.27)
            .rotation(28_255.0)
            .orbit(EVE_MU, 31_500_000.0, 0.55, 12.0),
    );
    let kerbin = s.add(
        Some(sun),
        BodySpec::new("Kerbin", 600_000.0, 5.291_515_8e22, KERBIN_MU)
            .soi(84_159_286.0)
            .rotation(21_549.425)
            .atmosphere(5.0, 1.0, true)
            .orbit(SUN_MU, 13_599_840_256.0, 0.0, 0.0),
    );
    s.add(
        Some(kerbin),
        BodySpec::new("Mun", 200_000.0, 9.759_906_6e20, 6.513_839_8e10)
            .soi(2_429_559.1)
            .rotation(138_984.38)
            .orbit(KERBIN_MU, 12_000_000.0, 0.0, 0.0),
    );
    s.add(
        Some(kerbin),
        BodySpec::new("Minmus", 60_000.0, 2.645_758_2e19, 1.765_8e9)
            .soi(2_247_428.4)
            .rotation(40_400.0)
            .orbit(KERBIN_MU, 47_000_000.0, 0.0, 6.0),
    );
    let duna = s.add(
        Some(sun),
        BodySpec::new("Duna", 320_000.0, 4.515_427e21, DUNA_MU)
            .soi(47_921_949.0)
            .rotation(65_517.859)
            .atmosphere(3.0, 0.2, false)
            .orbit(SUN_MU, 20_726_155_264.0, 0.051, 0.06),
    );
    s.add(
        Some(duna),
        BodySpec::new("Ike", 130_000.0, 2.782_161_5e20, 1.856_836_9e10)
            .soi(1_049_598.9)
            .rotation(65_517.862)
            .orbit(DUNA_MU, 3_200_000.0, 0.03, 0.2),
    );
    s.add(
        Some(sun),
        BodySpec::new("Dres", 138_000.0, 3.219_093_7e20, 2.148_448_9e10)
            .soi(32_832_840.0)
            .rotation(34_800.0)
            .orbit(SUN_MU, 40_839_348_203.0, 0.145, 5.0),
    );
    let jool = s.add(
        Some(sun),
        BodySpec::new("Jool", 6_000_000.0, 4.233_263_5e24, JOOL_MU)
            .soi(2_455_985_200.0)
            .rotation(36_000.0)
            .scaled_size(1.0)
            .atmosphere(10.0, 15.0, false)
            .orbit(SUN_MU, 68_773_560_320.0, 0.05, 1.304),
    );
    s.add(
        Some(jool),
        BodySpec::new("Laythe", 500_000.0, 2.939_766_3e22, 1.962e12)
            .soi(3_723_645.8)
            .rotation(52_980.879)
            .atmosphere(4.0, 0.8, true)
            .orbit(JOOL_MU, 27_184_000.0, 0.0, 0.0),
    );
    s.add(
        Some(jool),
        BodySpec::new("Vall", 300_000.0, 3.108_802_8e21, 2.074_815e11)
            .soi(2_406_401.4)
            .rotation(105_962.09)
            .orbit(JOOL_MU, 43_152_000.0, 0.0, 0.0),
    );
    s.add(
        Some(jool),
        BodySpec::new("Tylo", 600_000.0, 4.233_263_5e22, 2.825_28e12)
            .soi(10_856_518.0)
            .rotation(211_926.36)
            .orbit(JOOL_MU, 68_500_000.0, 0.0, 0.025),
    );
    s.add(
        Some(jool),
        BodySpec::new("Bop", 65_000.0, 3.726_153_6e19, 2.486_834_9e9)
            .soi(1_221_060.9)
            .rotation(544_507.43)
            .orbit(JOOL_MU, 128_500_000.0, 0.235, 15.0),
    );
    s.add(
        Some(jool),
        BodySpec::new("Pol", 44_000.0, 1.081_363_6e19, 7.217_020_8e8)
            .soi(1_042_138.9)
            .rotation(901_902.62)
            .orbit(JOOL_MU, 179_890_000.0, 0.171, 4.25),
    );
    s.add(
        Some(sun),
        BodySpec::new("Eeloo", 210_000.0, 1.114_935_8e21, 7.441_081_5e10)
            .soi(119_082_940.0)
            .rotation(19_460.0)
            .orbit(SUN_MU, 90_118_820_000.0, 0.26, 6.15),
    );

    s.focus(kerbin);
    s.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;

    #[test]
    fn stock_system_shape() {
        let host = stock_home_system();
        let bodies = host.snapshot_bodies();
        assert_eq!(bodies.len(), 17);
        let sun = &bodies[0];
        assert_eq!(sun.name, "Sun");
        assert_eq!(sun.children.len(), 7);
        assert!(sun.orbit.is_none());

        let jool = host.body(host.body_key("Jool").unwrap()).unwrap();
        assert_eq!(jool.children.len(), 5);
        let kerbin = host.body(host.main_body()).unwrap();
        assert_eq!(kerbin.name, "Kerbin");
        assert!(kerbin.atmosphere.oxygen);
        // Stock year is about 9.2 million seconds.
        let year = kerbin.orbit.unwrap().period;
        assert!((year - 9_203_545.0).abs() < 10_000.0, "{year}");
    }
}

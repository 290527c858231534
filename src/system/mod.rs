//! Star systems: capturing the host's bodies, randomizing them from a seed,
//! and keeping one record per seed.

pub mod body;
pub mod facets;
pub mod hierarchy;
pub mod naming;
pub mod registry;

pub use body::BodyRecord;
pub use registry::{SystemRecord, SystemRegistry};

use crate::config::GenerationConfig;
use crate::id::BodyId;
use crate::procgen::WarpRng;

/// Id of the star in every system.
pub const STAR: BodyId = 0;

/// Shared state threaded through every randomizer of one system.
pub struct GenContext<'a> {
    pub rng: &'a mut WarpRng,
    pub config: &'a GenerationConfig,
}

/// Randomize every facet of every body in traversal order, then assign
/// final names. The stream is seeded from `seed` alone, so the same seed
/// over the same host bodies always gives the same system.
pub fn randomize_system(seed: &str, bodies: &mut [BodyRecord], config: &GenerationConfig) {
    let mut rng = WarpRng::new(seed);
    let mut ctx = GenContext { rng: &mut rng, config };

    // Children are re-registered as orbits complete.
    for body in bodies.iter_mut() {
        body.children.clear();
    }
    for id in 0..bodies.len() {
        facets::orbit::randomize(bodies, id, &mut ctx);
        facets::geology::randomize(bodies, id, &mut ctx);
        facets::general::randomize(bodies, id, &mut ctx);
        facets::atmosphere::randomize(bodies, id, &mut ctx);
    }
    naming::name_bodies(bodies);
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::test_support::sample_bodies;

    #[test]
    fn same_seed_same_system() {
        let config = GenerationConfig::default();
        let mut a = sample_bodies();
        let mut b = sample_bodies();
        randomize_system("Alpha", &mut a, &config);
        randomize_system("Alpha", &mut b, &config);
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.name(), y.name());
            assert_eq!(x.reference, y.reference);
            assert_eq!(x.orbit.elements, y.orbit.elements);
            assert_eq!(x.atmosphere.values, y.atmosphere.values);
        }
    }

    #[test]
    fn every_facet_completes() {
        let mut bodies = sample_bodies();
        randomize_system("Beta", &mut bodies, &GenerationConfig::default());
        hierarchy::check_generated(&bodies).unwrap();
        for body in &bodies {
            assert_eq!(body.orbit.state, facets::FacetState::Computed);
            assert_eq!(body.geology.state, facets::FacetState::Computed);
            assert_eq!(body.general.state, facets::FacetState::Computed);
            assert_eq!(body.atmosphere.state, facets::FacetState::Computed);
            assert!(body.general.named);
        }
    }
}

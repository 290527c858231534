use crate::engine::BodyState;
use crate::id::{BodyId, BodyKey};

use super::facets::{AtmosphereFacet, GeneralFacet, GeologyFacet, OrbitFacet};

/// One body of one system: the host values captured at build time plus the
/// four facets randomized from them.
#[derive(Debug, Clone)]
pub struct BodyRecord {
    pub id: BodyId,
    /// Seed of the system that owns this record.
    pub seed: String,
    pub key: BodyKey,
    /// Host state as it was before any randomization.
    pub cached: BodyState,
    /// Body this one orbits. The star references itself.
    pub reference: BodyId,
    pub children: Vec<BodyId>,
    pub orbit: OrbitFacet,
    pub geology: GeologyFacet,
    pub general: GeneralFacet,
    pub atmosphere: AtmosphereFacet,
}

impl BodyRecord {
    /// Cache stage of every facet.
    pub fn capture(seed: &str, id: BodyId, key: BodyKey, cached: BodyState, reference: BodyId) -> Self {
        Self {
            id,
            seed: seed.to_string(),
            key,
            orbit: OrbitFacet::capture(&cached),
            geology: GeologyFacet::capture(&cached),
            general: GeneralFacet::capture(&cached),
            atmosphere: AtmosphereFacet::capture(&cached),
            cached,
            reference,
            children: Vec::new(),
        }
    }

    pub fn is_star(&self) -> bool {
        self.reference == self.id
    }

    pub fn name(&self) -> &str {
        &self.general.name
    }

    pub fn radius(&self) -> f64 {
        self.cached.radius
    }

    pub fn semi_major_axis(&self) -> f64 {
        self.orbit.elements.semi_major_axis
    }

    pub fn sphere_of_influence(&self) -> f64 {
        self.orbit.sphere_of_influence
    }
}

use crate::engine::BodyState;
use crate::id::BodyId;
use crate::system::GenContext;
use crate::system::body::BodyRecord;

use super::FacetState;

/// Working name of a body. `named` is set once a final name is assigned,
/// after which nothing renames it.
#[derive(Debug, Clone)]
pub struct GeneralFacet {
    pub state: FacetState,
    pub name: String,
    pub named: bool,
}

impl GeneralFacet {
    pub fn capture(cached: &BodyState) -> Self {
        Self {
            state: FacetState::Uncomputed,
            name: cached.name.clone(),
            named: false,
        }
    }

    pub fn write(&self, out: &mut BodyState) {
        out.name.clone_from(&self.name);
    }
}

/// Give the star of a generated system its name. Planets and moons keep
/// their working names until the naming pass.
pub fn randomize(bodies: &mut [BodyRecord], id: BodyId, ctx: &mut GenContext<'_>) {
    let body = &mut bodies[id];
    if body.general.state == FacetState::Computed {
        return;
    }
    if body.is_star() && !body.general.named {
        body.general.name = ctx.rng.next_name_pair();
        body.general.named = true;
        tracing::debug!(star = %body.general.name, "star named");
    }
    body.general.state = FacetState::Computed;
}

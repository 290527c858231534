use std::collections::BTreeMap;

use crate::id::BodyId;
use crate::procgen::names::{planet_letter, roman_numeral};

use super::STAR;
use super::body::BodyRecord;

/// Final names for every non-star body, closest first: planets take the
/// star's name plus a letter from "b", moons take their planet's name plus a
/// numeral. Bodies already named are left alone.
pub fn name_bodies(bodies: &mut [BodyRecord]) {
    let mut groups: BTreeMap<BodyId, Vec<BodyId>> = BTreeMap::new();
    for body in bodies.iter().filter(|b| !b.is_star()) {
        groups.entry(body.reference).or_default().push(body.id);
    }
    for members in groups.values_mut() {
        members.sort_by(|&a, &b| {
            bodies[a]
                .semi_major_axis()
                .total_cmp(&bodies[b].semi_major_axis())
        });
    }

    // Moon names are built from planet names, so planets go first.
    if let Some(planets) = groups.remove(&STAR) {
        assign(bodies, STAR, &planets, planet_letter);
    }
    for (parent, moons) in groups {
        assign(bodies, parent, &moons, roman_numeral);
    }
}

fn assign(bodies: &mut [BodyRecord], parent: BodyId, members: &[BodyId], designation: fn(usize) -> String) {
    let prefix = bodies[parent].general.name.clone();
    for (rank, &id) in members.iter().enumerate() {
        let general = &mut bodies[id].general;
        if general.named {
            continue;
        }
        general.name = format!("{prefix} {}", designation(rank));
        general.named = true;
    }
}

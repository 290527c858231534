use std::collections::BTreeSet;

use crate::engine::{Engine, find_star};
use crate::error::{Result, WarpError};
use crate::id::{BodyId, BodyKey};

use super::STAR;
use super::body::BodyRecord;

/// Capture the host's body tree from the star down. Ids follow depth-first
/// preorder, so the star is `0` and every parent precedes its children.
pub fn build(seed: &str, engine: &dyn Engine) -> Result<Vec<BodyRecord>> {
    let star = find_star(engine)?;
    let mut visited = BTreeSet::from([star]);
    let mut bodies = vec![BodyRecord::capture(seed, STAR, star, engine.body(star)?, STAR)];
    visit(seed, engine, &mut bodies, STAR, &mut visited)?;
    tracing::debug!(seed, bodies = bodies.len(), "hierarchy captured");
    Ok(bodies)
}

fn visit(
    seed: &str,
    engine: &dyn Engine,
    bodies: &mut Vec<BodyRecord>,
    parent: BodyId,
    visited: &mut BTreeSet<BodyKey>,
) -> Result<()> {
    let keys = bodies[parent].cached.children.clone();
    for key in keys {
        if !visited.insert(key) {
            return Err(WarpError::BrokenHierarchy(format!(
                "body {key} is reachable twice"
            )));
        }
        let id = bodies.len();
        bodies.push(BodyRecord::capture(seed, id, key, engine.body(key)?, parent));
        bodies[parent].children.push(id);
        visit(seed, engine, bodies, id, visited)?;
    }
    Ok(())
}

/// Hops from `id` to the star, or `None` for a cycle or dangling reference.
pub fn depth(bodies: &[BodyRecord], id: BodyId) -> Option<usize> {
    let mut current = id;
    for hops in 0..=bodies.len() {
        let body = bodies.get(current)?;
        if body.is_star() {
            return Some(hops);
        }
        current = body.reference;
    }
    None
}

/// A generated system has one star at id `0` and nothing deeper than a moon.
pub fn check_generated(bodies: &[BodyRecord]) -> Result<()> {
    let stars = bodies.iter().filter(|b| b.is_star()).count();
    if stars != 1 || !bodies.first().is_some_and(BodyRecord::is_star) {
        return Err(WarpError::BrokenHierarchy(format!(
            "expected exactly one star at id 0, found {stars}"
        )));
    }
    for body in bodies {
        match depth(bodies, body.id) {
            Some(hops) if hops <= 2 => {}
            Some(hops) => {
                return Err(WarpError::BrokenHierarchy(format!(
                    "{} sits {hops} levels below the star",
                    body.name()
                )));
            }
            None => {
                return Err(WarpError::BrokenHierarchy(format!(
                    "{} never reaches the star",
                    body.name()
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::stock_home_system;

    #[test]
    fn preorder_puts_parents_first() {
        let host = stock_home_system();
        let bodies = build("Kerbol", &host).unwrap();
        assert_eq!(bodies.len(), 17);
        assert_eq!(bodies[0].name(), "Sun");
        for body in bodies.iter().skip(1) {
            assert!(body.reference < body.id);
            assert!(bodies[body.reference].children.contains(&body.id));
        }
        let mun = bodies.iter().find(|b| b.name() == "Mun").unwrap();
        assert_eq!(bodies[mun.reference].name(), "Kerbin");
        assert_eq!(depth(&bodies, mun.id), Some(2));
        check_generated(&bodies).unwrap();
    }

    #[test]
    fn cycles_are_rejected() {
        let host = stock_home_system();
        let mut bodies = build("Kerbol", &host).unwrap();
        bodies[1].reference = 2;
        bodies[2].reference = 1;
        assert_eq!(depth(&bodies, 1), None);
        assert!(matches!(check_generated(&bodies), Err(WarpError::BrokenHierarchy(_))));
    }
}

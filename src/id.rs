/// Index of a body inside one generated system. Assignment order is the
/// hierarchy traversal order, so the star is always `0`.
pub type BodyId = usize;

/// Host-side identifier of a celestial body object.
pub type BodyKey = u64;

/// Globally unique id of a persistent entity (vessel). Stable across
/// despawn/respawn and across systems.
pub type EntityId = u64;

/// Host-side handle of one live (spawned) entity instance. A fresh key is
/// issued on every load, so two instances of the same entity never share one.
pub type InstanceKey = u64;

/// Monotonic key generator used by hosts for body keys and instance keys.
#[derive(Debug)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

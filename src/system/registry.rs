use std::collections::HashMap;

use crate::config::{GenerationConfig, WarpConfig};
use crate::engine::{BodyState, Engine};
use crate::error::{Result, WarpError};
use crate::id::BodyId;

use super::body::BodyRecord;
use super::{STAR, hierarchy, randomize_system};

/// Every body of one seed's system, in traversal order.
#[derive(Debug, Clone)]
pub struct SystemRecord {
    pub seed: String,
    /// The star's final name, or the configured home name for a star called "Sun".
    pub name: String,
    /// `false` for the home system, which only holds captured host values.
    pub generated: bool,
    pub bodies: Vec<BodyRecord>,
}

impl SystemRecord {
    pub fn star(&self) -> &BodyRecord {
        &self.bodies[STAR]
    }

    pub fn body(&self, id: BodyId) -> Option<&BodyRecord> {
        self.bodies.get(id)
    }

    pub fn find(&self, name: &str) -> Option<&BodyRecord> {
        self.bodies.iter().find(|b| b.name() == name)
    }

    /// State to write onto the host for one body. Captured systems hand back
    /// exactly what was read.
    pub fn body_state(&self, id: BodyId, now: f64) -> BodyState {
        let body = &self.bodies[id];
        let mut out = body.cached.clone();
        if !self.generated {
            return out;
        }
        body.general.write(&mut out);
        out.reference = self.bodies[body.reference].key;
        out.children = body.children.iter().map(|&c| self.bodies[c].key).collect();
        let parent = (!body.is_star()).then(|| &self.bodies[body.reference]);
        body.orbit.write(&mut out, parent, now);
        body.geology.write(&mut out);
        body.atmosphere.write(&mut out);
        out
    }

    /// Write every body back onto the host.
    pub fn apply(&self, engine: &mut dyn Engine) -> Result<()> {
        let now = engine.universal_time();
        for body in &self.bodies {
            engine.write_body(body.key, &self.body_state(body.id, now))?;
        }
        Ok(())
    }
}

/// One record per seed for the lifetime of the session. Records are never
/// regenerated: revisiting a seed re-applies what was cached.
#[derive(Debug)]
pub struct SystemRegistry {
    home_seed: String,
    home_system_name: String,
    generation: GenerationConfig,
    systems: HashMap<String, SystemRecord>,
    active: Option<String>,
}

impl SystemRegistry {
    pub fn new(config: &WarpConfig) -> Self {
        Self {
            home_seed: config.home_seed.clone(),
            home_system_name: config.home_system_name.clone(),
            generation: config.generation.clone(),
            systems: HashMap::new(),
            active: None,
        }
    }

    pub fn home_seed(&self) -> &str {
        &self.home_seed
    }

    /// Seed whose values are currently on the host.
    pub fn active_seed(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn get(&self, seed: &str) -> Option<&SystemRecord> {
        self.systems.get(seed)
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Make `seed` the system on the host, generating it on first use.
    ///
    /// The home seed is only captured. Any other seed is generated from the
    /// home bodies, so the host is reset to home first. On failure the
    /// previously active system is re-applied and the error is returned as
    /// `GenerationFailure`.
    pub fn get_or_create(&mut self, seed: &str, engine: &mut dyn Engine) -> Result<&SystemRecord> {
        let result = if self.systems.contains_key(seed) {
            self.reactivate(seed, engine)
        } else {
            self.create(seed, engine)
        };
        if let Err(err) = result {
            self.restore(engine);
            return Err(WarpError::generation(seed, err));
        }
        self.active = Some(seed.to_string());
        self.systems.get(seed).ok_or_else(|| {
            WarpError::generation(seed, WarpError::BrokenHierarchy("record was not stored".into()))
        })
    }

    fn reactivate(&mut self, seed: &str, engine: &mut dyn Engine) -> Result<()> {
        if let Some(record) = self.systems.get(seed) {
            record.apply(engine)?;
            tracing::info!(seed, system = %record.name, "system re-activated");
        }
        Ok(())
    }

    fn create(&mut self, seed: &str, engine: &mut dyn Engine) -> Result<()> {
        if seed == self.home_seed {
            let bodies = hierarchy::build(seed, engine)?;
            let record = self.record(seed, false, bodies);
            tracing::info!(seed, system = %record.name, bodies = record.bodies.len(), "home system captured");
            self.systems.insert(seed.to_string(), record);
            return Ok(());
        }

        self.reset_to_home(engine)?;
        let mut bodies = hierarchy::build(seed, engine)?;
        randomize_system(seed, &mut bodies, &self.generation);
        hierarchy::check_generated(&bodies)?;
        let record = self.record(seed, true, bodies);
        record.apply(engine)?;
        tracing::info!(seed, system = %record.name, bodies = record.bodies.len(), "system generated");
        self.systems.insert(seed.to_string(), record);
        Ok(())
    }

    /// Put the home values back on the host, capturing them on first use.
    fn reset_to_home(&mut self, engine: &mut dyn Engine) -> Result<()> {
        let home = self.home_seed.clone();
        match self.systems.get(&home) {
            None => self.create(&home, engine),
            Some(record) if self.active.as_deref() != Some(home.as_str()) => record.apply(engine),
            Some(_) => Ok(()),
        }
    }

    /// Re-apply the active system. Before anything was activated the host
    /// was showing home, which `reset_to_home` has captured by then.
    fn restore(&self, engine: &mut dyn Engine) {
        let seed = self.active.as_deref().unwrap_or(self.home_seed.as_str());
        let Some(record) = self.systems.get(seed) else {
            return;
        };
        if let Err(err) = record.apply(engine) {
            tracing::error!(seed = %record.seed, %err, "failed to restore previous system");
        }
    }

    fn record(&self, seed: &str, generated: bool, bodies: Vec<BodyRecord>) -> SystemRecord {
        let star = bodies.first().map(|b| b.name().to_string()).unwrap_or_default();
        let name = if star.eq_ignore_ascii_case("sun") {
            self.home_system_name.clone()
        } else {
            star
        };
        SystemRecord {
            seed: seed.to_string(),
            name,
            generated,
            bodies,
        }
    }
}

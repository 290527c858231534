//! Moving persistent entities between the host and per-seed snapshots.

pub mod entity;
pub mod manager;

pub use entity::{EntityState, PersistentEntity};
pub use manager::{FlushReport, MigrationManager, MigrationReport, PopulateReport};

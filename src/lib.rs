pub mod astro;
pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod id;
pub mod migration;
pub mod procgen;
pub mod scenario;
pub mod store;
pub mod system;
pub mod warp;

pub use config::{GenerationConfig, WarpConfig};
pub use engine::{BodyState, Engine, EntityRecord, LiveEntity};
pub use error::{Result, WarpError};
pub use host::EcsHost;
pub use id::{BodyId, BodyKey, EntityId, IdGenerator, InstanceKey};
pub use migration::MigrationManager;
pub use store::{JsonlStore, LiveState, MemoryStore, SnapshotStore};
pub use system::{SystemRecord, SystemRegistry};
pub use warp::WarpDrive;

//! Error types for system generation and entity migration.

use thiserror::Error;

use crate::id::{BodyKey, EntityId, InstanceKey};

/// Result type alias for warp operations.
pub type Result<T> = std::result::Result<T, WarpError>;

#[derive(Error, Debug)]
pub enum WarpError {
    /// Seed was empty after stripping non-printable characters.
    #[error("invalid seed {0:?}: no printable characters")]
    InvalidSeed(String),

    /// Randomization or application of a system failed. The previously
    /// active system stays active.
    #[error("failed to generate system {seed:?}: {source}")]
    GenerationFailure {
        seed: String,
        #[source]
        source: Box<WarpError>,
    },

    /// No durable snapshot exists for the seed. Means "first visit".
    #[error("no snapshot stored for seed {0:?}")]
    SnapshotMissing(String),

    /// Entity id already has a live instance.
    #[error("entity {0} is already spawned")]
    DuplicateEntity(EntityId),

    /// The host refused to unload an entity because it is still active.
    #[error("host refused to despawn entity {0}: still active")]
    DespawnRefused(EntityId),

    #[error("body {0} does not exist in the host")]
    BodyMissing(BodyKey),

    #[error("live instance {0} does not exist in the host")]
    InstanceMissing(InstanceKey),

    #[error("body hierarchy is broken: {0}")]
    BrokenHierarchy(String),

    #[error("no active entity to migrate")]
    NoActiveEntity,

    #[error("entity {0} is not live")]
    EntityNotLive(EntityId),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WarpError {
    pub fn generation(seed: &str, source: WarpError) -> Self {
        match source {
            already @ WarpError::GenerationFailure { .. } => already,
            other => WarpError::GenerationFailure {
                seed: seed.to_string(),
                source: Box::new(other),
            },
        }
    }
}

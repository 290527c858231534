//! Per-body randomizers. Each facet caches the host's values when the body
//! record is built, randomizes from the shared stream, and writes its fields
//! back onto a [`BodyState`](crate::engine::BodyState) on apply.

pub mod atmosphere;
pub mod general;
pub mod geology;
pub mod orbit;

pub use atmosphere::AtmosphereFacet;
pub use general::GeneralFacet;
pub use geology::GeologyFacet;
pub use orbit::OrbitFacet;

/// Lifecycle of one facet on one body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FacetState {
    /// Holding the values captured from the host.
    #[default]
    Uncomputed,
    /// Randomization started but has not finished. Only the orbit facet
    /// passes through here, while it resolves its reference body.
    InProgress,
    Computed,
}

/// Return `value`, or `default` (with a warning) when it is NaN.
pub(crate) fn replace_nan(value: f64, default: f64, body: &str, field: &'static str) -> f64 {
    if value.is_nan() {
        tracing::warn!(body, field, default, "NaN replaced with default");
        default
    } else {
        value
    }
}

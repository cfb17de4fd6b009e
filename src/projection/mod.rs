//! Spherical projection of flat images onto the globe.
//!
//! - [`SphericalProjector`]: forward projection and in-place morphing
//! - [`ProjectionRegistry`]: per-projection records backing the morph pass
//! - [`DistributionPlanner`]: even placement of N images over the sphere

pub mod distribution;
pub mod projector;
pub mod registry;

use slotmap::new_key_type;

new_key_type! {
    /// Handle to a projected mesh owned by a [`SphericalProjector`].
    pub struct MeshKey;
}

/// Geographic position on the sphere, in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GeoPosition {
    pub lat: f32,
    pub lng: f32,
}

impl GeoPosition {
    #[must_use]
    pub fn new(lat: f32, lng: f32) -> Self {
        Self { lat, lng }
    }
}

pub use distribution::{DistributionOptions, DistributionPlanner};
pub use projector::{
    surface_offset, BatchProjectionOptions, ProjectedMesh, ProjectionParams, SphericalProjector,
    MAX_SURFACE_OFFSET,
};
pub use registry::{ProjectionRecord, ProjectionRegistry};

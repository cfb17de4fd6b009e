use std::f32::consts::TAU;
use std::time::Duration;

use crate::scene::transform::Transform;

/// The shared mutable animation target.
///
/// One instance per globe; the animation engine receives it by `&mut` each
/// tick (all mutation is synchronous inside the frame callback, so no
/// locking exists anywhere in the core). Besides the transform it carries
/// the two side-channel scalars:
///
/// - `image_scale` — the global size multiplier for all projected images.
///   A version counter lets the driver forward changes to the projector's
///   morph pass without comparing floats every frame.
/// - `rotation_speed` — radians per second of the continuous y-axis spin.
///
/// Step-driven animation writes rotation x and z only; y belongs to
/// [`GlobeStage::advance_spin`].
#[derive(Debug, Clone)]
pub struct GlobeStage {
    pub transform: Transform,
    image_scale: f32,
    image_scale_version: u64,
    rotation_speed: f32,
}

impl GlobeStage {
    #[must_use]
    pub fn new() -> Self {
        Self {
            transform: Transform::new(),
            image_scale: 1.0,
            image_scale_version: 0,
            rotation_speed: 0.0,
        }
    }

    #[must_use]
    pub fn image_scale(&self) -> f32 {
        self.image_scale
    }

    /// Version counter bumped on every side-channel write, changed or not;
    /// the writer (the engine's last-seen guard) is responsible for not
    /// writing redundant values.
    #[must_use]
    pub fn image_scale_version(&self) -> u64 {
        self.image_scale_version
    }

    pub fn set_image_scale(&mut self, value: f32) {
        self.image_scale = value;
        self.image_scale_version = self.image_scale_version.wrapping_add(1);
    }

    #[must_use]
    pub fn rotation_speed(&self) -> f32 {
        self.rotation_speed
    }

    pub fn set_rotation_speed(&mut self, value: f32) {
        self.rotation_speed = value;
    }

    /// Integrates the continuous y-axis spin.
    ///
    /// Driven independently of the step queue; wraps to keep the angle
    /// bounded over long sessions.
    pub fn advance_spin(&mut self, dt: Duration) {
        let y = self.transform.rotation.y + self.rotation_speed * dt.as_secs_f32();
        self.transform.rotation.y = y.rem_euclid(TAU);
    }
}

impl Default for GlobeStage {
    fn default() -> Self {
        Self::new()
    }
}

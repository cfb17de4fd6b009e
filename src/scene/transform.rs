use glam::{Affine3A, EulerRot, Mat4, Quat, Vec3};

/// Transform component.
///
/// Wraps position, rotation and scale (TRS) together with a cached local
/// matrix and shadow-state dirty checking. Rotation is stored as XYZ Euler
/// angles in radians because the animation surface addresses axes
/// individually: steps drive x and z while the continuous spin owns y.
#[derive(Debug, Clone)]
pub struct Transform {
    // === Public attributes ===
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,

    // === Matrix cache (internal) ===
    local_matrix: Affine3A,

    // === Shadow state for dirty checking (private) ===
    last_position: Vec3,
    last_rotation: Vec3,
    last_scale: Vec3,
    force_update: bool,
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,

            local_matrix: Affine3A::IDENTITY,

            last_position: Vec3::ZERO,
            last_rotation: Vec3::ZERO,
            last_scale: Vec3::ONE,
            force_update: true,
        }
    }

    // ========================================================================
    // Core logic: shadow-state check
    // ========================================================================

    /// Checks the public attributes against the shadow state and recomputes
    /// the local matrix only when something changed.
    ///
    /// Returns whether a recompute happened.
    pub fn update_local_matrix(&mut self) -> bool {
        let changed = self.position != self.last_position
            || self.rotation != self.last_rotation
            || self.scale != self.last_scale
            || self.force_update;

        if changed {
            self.local_matrix = Affine3A::from_scale_rotation_translation(
                self.scale,
                self.rotation_quat(),
                self.position,
            );

            self.last_position = self.position;
            self.last_rotation = self.rotation;
            self.last_scale = self.scale;
            self.force_update = false;
        }

        changed
    }

    // ========================================================================
    // Getters & helpers
    // ========================================================================

    /// Current rotation as a quaternion (XYZ order).
    #[must_use]
    pub fn rotation_quat(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        )
    }

    /// Local matrix (`Affine3A`), as of the last `update_local_matrix`.
    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> &Affine3A {
        &self.local_matrix
    }

    /// Local matrix as `Mat4`, for upload by a renderer.
    #[inline]
    #[must_use]
    pub fn local_matrix_as_mat4(&self) -> Mat4 {
        Mat4::from(self.local_matrix)
    }

    /// Manually marks the transform dirty (forces the next recompute).
    pub fn mark_dirty(&mut self) {
        self.force_update = true;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::animation::easing::Easing;
use crate::errors::{GyreError, Result};

/// Per-axis partial override for a `Vec3` property.
///
/// `None` means "keep the current value" — steps are partial updates, not
/// full replaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f32>,
}

impl AxisDelta {
    #[must_use]
    pub fn all(v: Vec3) -> Self {
        Self {
            x: Some(v.x),
            y: Some(v.y),
            z: Some(v.z),
        }
    }

    /// Overlays the present axes onto a base vector.
    #[must_use]
    pub fn overlay(&self, base: Vec3) -> Vec3 {
        Vec3::new(
            self.x.unwrap_or(base.x),
            self.y.unwrap_or(base.y),
            self.z.unwrap_or(base.z),
        )
    }

    fn check_finite(&self, context: &str) -> Result<()> {
        for v in [self.x, self.y, self.z].into_iter().flatten() {
            if !v.is_finite() {
                return Err(GyreError::invalid(context, f64::from(v)));
            }
        }
        Ok(())
    }
}

/// Step-addressable rotation axes.
///
/// The y axis is absent by construction: it is driven by the continuous
/// spin, and step-driven rotation must never overwrite it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanarDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f32>,
}

impl PlanarDelta {
    fn check_finite(&self, context: &str) -> Result<()> {
        for v in [self.x, self.z].into_iter().flatten() {
            if !v.is_finite() {
                return Err(GyreError::invalid(context, f64::from(v)));
            }
        }
        Ok(())
    }
}

/// The partial property bag a step animates toward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StepDelta {
    #[serde(default)]
    pub scale: AxisDelta,
    #[serde(default)]
    pub position: AxisDelta,
    #[serde(default)]
    pub rotation: PlanarDelta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_scale: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation_speed: Option<f32>,
}

impl StepDelta {
    /// Boundary validation: every present value must be finite.
    pub fn validate(&self) -> Result<()> {
        self.scale.check_finite("step scale delta")?;
        self.position.check_finite("step position delta")?;
        self.rotation.check_finite("step rotation delta")?;
        for (context, v) in [
            ("step image_scale delta", self.image_scale),
            ("step rotation_speed delta", self.rotation_speed),
        ] {
            if let Some(v) = v {
                if !v.is_finite() {
                    return Err(GyreError::invalid(context, f64::from(v)));
                }
            }
        }
        Ok(())
    }
}

/// One queued interpolation.
///
/// Timing is governed by exactly one of the explicit fields or the
/// keyframe reference: when responsive mode is active and `keyframe_ref`
/// resolves, the named timing triple overrides duration, delay and easing
/// at enqueue time.
#[derive(Clone)]
pub struct AnimationStep {
    pub delta: StepDelta,
    pub duration: Duration,
    pub delay: Duration,
    pub easing: Easing,
    pub keyframe_ref: Option<String>,
    pub(crate) on_complete: Option<Rc<dyn Fn()>>,
}

impl AnimationStep {
    #[must_use]
    pub fn new() -> Self {
        Self {
            delta: StepDelta::default(),
            duration: Duration::ZERO,
            delay: Duration::ZERO,
            easing: Easing::Linear,
            keyframe_ref: None,
            on_complete: None,
        }
    }

    #[must_use]
    pub fn scale(mut self, scale: Vec3) -> Self {
        self.delta.scale = AxisDelta::all(scale);
        self
    }

    #[must_use]
    pub fn position(mut self, position: Vec3) -> Self {
        self.delta.position = AxisDelta::all(position);
        self
    }

    #[must_use]
    pub fn rotation_x(mut self, radians: f32) -> Self {
        self.delta.rotation.x = Some(radians);
        self
    }

    #[must_use]
    pub fn rotation_z(mut self, radians: f32) -> Self {
        self.delta.rotation.z = Some(radians);
        self
    }

    #[must_use]
    pub fn image_scale(mut self, multiplier: f32) -> Self {
        self.delta.image_scale = Some(multiplier);
        self
    }

    #[must_use]
    pub fn rotation_speed(mut self, radians_per_sec: f32) -> Self {
        self.delta.rotation_speed = Some(radians_per_sec);
        self
    }

    #[must_use]
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Fallible variant resolving the easing from its table name.
    pub fn easing_name(mut self, name: &str) -> Result<Self> {
        self.easing = Easing::from_name(name)?;
        Ok(self)
    }

    #[must_use]
    pub fn keyframe(mut self, name: impl Into<String>) -> Self {
        self.keyframe_ref = Some(name.into());
        self
    }

    #[must_use]
    pub fn on_complete(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_complete = Some(Rc::new(callback));
        self
    }
}

impl Default for AnimationStep {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AnimationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationStep")
            .field("delta", &self.delta)
            .field("duration", &self.duration)
            .field("delay", &self.delay)
            .field("easing", &self.easing)
            .field("keyframe_ref", &self.keyframe_ref)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

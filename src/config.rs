//! Responsive configuration.
//!
//! The configuration is an explicitly constructed value with a defined
//! lifecycle: loaded once ([`ResponsiveConfig::from_json`]), optionally
//! overridden via a pure merge ([`ResponsiveConfig::with_overrides`]),
//! never mutated by downstream consumers. There is no module-level shared
//! state anywhere in the crate.

use std::time::Duration;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::animation::easing::Easing;
use crate::animation::step::{AnimationStep, AxisDelta, PlanarDelta, StepDelta};
use crate::errors::{GyreError, Result};
use crate::responsive::keyframes::{KeyframeTable, KeyframeTiming};

// ============================================================================
// Settings bundles (consumed opaquely by the bootstrap layer)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraSettings {
    pub position: [f32; 3],
    pub fov: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 40.0],
            fov: 45.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobeSettings {
    pub scale: f32,
    pub position: [f32; 3],
    /// Continuous spin, radians per second.
    pub rotation_speed: f32,
    /// Initial global image-size multiplier.
    pub image_scale: f32,
}

impl Default for GlobeSettings {
    fn default() -> Self {
        Self {
            scale: 1.0,
            position: [0.0, 0.0, 0.0],
            rotation_speed: 0.05,
            image_scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleSettings {
    pub count: u32,
    pub orbit_radius: f32,
    pub size: f32,
}

impl Default for ParticleSettings {
    fn default() -> Self {
        Self {
            count: 200,
            orbit_radius: 14.0,
            size: 0.08,
        }
    }
}

/// Everything a breakpoint overrides: scene settings plus the animation
/// step sequence played when the breakpoint activates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BreakpointSettings {
    #[serde(default)]
    pub camera: CameraSettings,
    #[serde(default)]
    pub globe: GlobeSettings,
    #[serde(default)]
    pub particles: ParticleSettings,
    #[serde(default)]
    pub sequence: Vec<StepConfig>,
}

// ============================================================================
// Keyframe timing + step configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyframeTimingConfig {
    pub duration_ms: f64,
    #[serde(default)]
    pub delay_ms: f64,
    pub easing: String,
}

impl KeyframeTimingConfig {
    fn to_timing(&self) -> Result<KeyframeTiming> {
        Ok(KeyframeTiming {
            duration: millis_to_duration(self.duration_ms, "keyframe duration_ms")?,
            delay: millis_to_duration(self.delay_ms, "keyframe delay_ms")?,
            easing: Easing::from_name(&self.easing)?,
        })
    }
}

fn default_easing_name() -> String {
    "linear".to_string()
}

/// One declarative animation step: either fully explicit, or referencing a
/// keyframe timing by name (which wins in responsive mode).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepConfig {
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
    #[serde(default)]
    pub duration_ms: f64,
    #[serde(default)]
    pub delay_ms: f64,
    #[serde(default = "default_easing_name")]
    pub easing: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyframe: Option<String>,
}

impl StepConfig {
    /// Builds the runtime step, validating all numeric fields and
    /// resolving the easing name fail-fast.
    pub fn to_step(&self) -> Result<AnimationStep> {
        let delta = StepDelta {
            scale: self.scale,
            position: self.position,
            rotation: self.rotation,
            image_scale: self.image_scale,
            rotation_speed: self.rotation_speed,
        };
        delta.validate()?;

        let mut step = AnimationStep::new()
            .duration(millis_to_duration(self.duration_ms, "step duration_ms")?)
            .delay(millis_to_duration(self.delay_ms, "step delay_ms")?)
            .easing(Easing::from_name(&self.easing)?);
        step.delta = delta;
        step.keyframe_ref = self.keyframe.clone();
        Ok(step)
    }
}

/// Negative or non-finite durations are rejected at the boundary; they
/// would otherwise surface as NaN deep inside an interpolation tick.
fn millis_to_duration(ms: f64, context: &str) -> Result<Duration> {
    if !ms.is_finite() || ms < 0.0 {
        return Err(GyreError::invalid(context, ms));
    }
    Ok(Duration::from_secs_f64(ms / 1000.0))
}

// ============================================================================
// Top-level configuration
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponsiveConfig {
    /// Breakpoint name → minimum viewport width in pixels.
    pub breakpoints: FxHashMap<String, f32>,
    /// Shared keyframe timing table.
    #[serde(default)]
    pub keyframes: FxHashMap<String, KeyframeTimingConfig>,
    /// Per-breakpoint settings bundles.
    #[serde(default)]
    pub settings: FxHashMap<String, BreakpointSettings>,
}

impl ResponsiveConfig {
    /// Loads and validates a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Structural validation, applied once at the loading boundary.
    pub fn validate(&self) -> Result<()> {
        if self.breakpoints.is_empty() {
            return Err(GyreError::ConfigError(
                "breakpoint table must not be empty".to_string(),
            ));
        }
        for (name, min_width) in &self.breakpoints {
            if !min_width.is_finite() || *min_width < 0.0 {
                return Err(GyreError::ConfigError(format!(
                    "breakpoint {name:?} has invalid minimum width {min_width}"
                )));
            }
        }
        for config in self.keyframes.values() {
            config.to_timing()?;
        }
        for (name, settings) in &self.settings {
            if !self.breakpoints.contains_key(name) {
                log::warn!("settings entry {name:?} does not match any breakpoint");
            }
            for step in &settings.sequence {
                step.to_step()?;
            }
        }
        Ok(())
    }

    /// Produces a new configuration with `overlay` deep-merged on top.
    ///
    /// A pure function over the serialized form: the base (`self`) is
    /// never mutated, and the result is re-validated.
    pub fn with_overrides(&self, overlay: &Value) -> Result<Self> {
        let base = serde_json::to_value(self)?;
        let merged = merge_values(&base, overlay);
        let config: Self = serde_json::from_value(merged)?;
        config.validate()?;
        Ok(config)
    }

    /// The runtime keyframe table (names resolved, durations parsed).
    pub fn keyframe_table(&self) -> Result<KeyframeTable> {
        let mut table = KeyframeTable::new();
        for (name, config) in &self.keyframes {
            table.insert(name.clone(), config.to_timing()?);
        }
        Ok(table)
    }

    #[must_use]
    pub fn settings_for(&self, breakpoint: &str) -> Option<&BreakpointSettings> {
        self.settings.get(breakpoint)
    }

    #[must_use]
    pub fn sequence_for(&self, breakpoint: &str) -> Option<&[StepConfig]> {
        self.settings
            .get(breakpoint)
            .map(|settings| settings.sequence.as_slice())
    }
}

/// Recursive deep merge: objects merge key-wise, any other overlay value
/// replaces the base wholesale. Neither input is mutated.
#[must_use]
pub fn merge_values(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            let mut merged = base_map.clone();
            for (key, overlay_value) in overlay_map {
                let entry = match base_map.get(key) {
                    Some(base_value) => merge_values(base_value, overlay_value),
                    None => overlay_value.clone(),
                };
                merged.insert(key.clone(), entry);
            }
            Value::Object(merged)
        }
        (_, overlay) => overlay.clone(),
    }
}

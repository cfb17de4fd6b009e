use std::f32::consts::PI;

use crate::errors::{GyreError, Result};

/// Fixed table of easing curves, resolved by name.
///
/// Resolution fails fast: an unknown name is a configuration error
/// surfaced at parse/enqueue time, never a silent fallback — a default
/// curve would corrupt animation pacing invisibly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    SineIn,
    SineOut,
    SineInOut,
    ExpoIn,
    ExpoOut,
    ExpoInOut,
    ElasticOut,
    BackOut,
}

impl Easing {
    /// Resolves a curve from its table name.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "linear" => Ok(Self::Linear),
            "quad-in" => Ok(Self::QuadIn),
            "quad-out" => Ok(Self::QuadOut),
            "quad-in-out" => Ok(Self::QuadInOut),
            "cubic-in" => Ok(Self::CubicIn),
            "cubic-out" => Ok(Self::CubicOut),
            "cubic-in-out" => Ok(Self::CubicInOut),
            "sine-in" => Ok(Self::SineIn),
            "sine-out" => Ok(Self::SineOut),
            "sine-in-out" => Ok(Self::SineInOut),
            "expo-in" => Ok(Self::ExpoIn),
            "expo-out" => Ok(Self::ExpoOut),
            "expo-in-out" => Ok(Self::ExpoInOut),
            "elastic-out" => Ok(Self::ElasticOut),
            "back-out" => Ok(Self::BackOut),
            other => Err(GyreError::UnknownEasing(other.to_string())),
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::QuadIn => "quad-in",
            Self::QuadOut => "quad-out",
            Self::QuadInOut => "quad-in-out",
            Self::CubicIn => "cubic-in",
            Self::CubicOut => "cubic-out",
            Self::CubicInOut => "cubic-in-out",
            Self::SineIn => "sine-in",
            Self::SineOut => "sine-out",
            Self::SineInOut => "sine-in-out",
            Self::ExpoIn => "expo-in",
            Self::ExpoOut => "expo-out",
            Self::ExpoInOut => "expo-in-out",
            Self::ElasticOut => "elastic-out",
            Self::BackOut => "back-out",
        }
    }

    /// Maps normalized progress `t` in [0, 1] to an eased value.
    ///
    /// Endpoints are exact for every curve: `apply(0) == 0`,
    /// `apply(1) == 1`. Elastic and back overshoot inside the interval.
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,

            Self::QuadIn => t * t,
            Self::QuadOut => t * (2.0 - t),
            Self::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }

            Self::CubicIn => t * t * t,
            Self::CubicOut => 1.0 - (1.0 - t).powi(3),
            Self::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }

            Self::SineIn => 1.0 - (t * PI / 2.0).cos(),
            Self::SineOut => (t * PI / 2.0).sin(),
            Self::SineInOut => -((PI * t).cos() - 1.0) / 2.0,

            Self::ExpoIn => {
                if t == 0.0 {
                    0.0
                } else {
                    2.0_f32.powf(10.0 * t - 10.0)
                }
            }
            Self::ExpoOut => {
                if t == 1.0 {
                    1.0
                } else {
                    1.0 - 2.0_f32.powf(-10.0 * t)
                }
            }
            Self::ExpoInOut => {
                if t == 0.0 {
                    0.0
                } else if t == 1.0 {
                    1.0
                } else if t < 0.5 {
                    2.0_f32.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2.0_f32.powf(-20.0 * t + 10.0)) / 2.0
                }
            }

            Self::ElasticOut => {
                if t == 0.0 {
                    0.0
                } else if t == 1.0 {
                    1.0
                } else {
                    let c = (2.0 * PI) / 3.0;
                    2.0_f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * c).sin() + 1.0
                }
            }

            Self::BackOut => {
                let c1 = 1.70158;
                let c3 = c1 + 1.0;
                1.0 + c3 * (t - 1.0).powi(3) + c1 * (t - 1.0).powi(2)
            }
        }
    }
}

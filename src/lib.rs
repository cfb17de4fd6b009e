#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod animation;
pub mod config;
pub mod errors;
pub mod projection;
pub mod resources;
pub mod responsive;
pub mod scene;
pub mod utils;

pub use animation::{AnimationQueueEngine, AnimationStep, CompletionTracker, Easing, StepDelta};
pub use config::{BreakpointSettings, ResponsiveConfig, StepConfig};
pub use errors::{GyreError, Result};
pub use projection::{
    BatchProjectionOptions, DistributionOptions, DistributionPlanner, GeoPosition, MeshKey,
    ProjectionParams, ProjectionRecord, SphericalProjector,
};
pub use resources::{Geometry, ImageSource, LoadedImage, MemoryImageSource};
pub use responsive::{BreakpointChange, BreakpointResolver, KeyframeTable, KeyframeTiming};
pub use scene::{GlobeStage, Transform};
pub use utils::Timer;

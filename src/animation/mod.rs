pub mod easing;
pub mod engine;
pub mod step;
pub mod tracker;

pub use easing::Easing;
pub use engine::{AnimationQueueEngine, StepCompleted, SETTLE_DELAY};
pub use step::{AnimationStep, AxisDelta, PlanarDelta, StepDelta};
pub use tracker::CompletionTracker;

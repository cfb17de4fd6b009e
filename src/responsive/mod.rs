pub mod breakpoints;
pub mod keyframes;

pub use breakpoints::{BreakpointChange, BreakpointResolver, DEBOUNCE_WINDOW};
pub use keyframes::{KeyframeTable, KeyframeTiming};

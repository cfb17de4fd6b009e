use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use crate::config::{BreakpointSettings, ResponsiveConfig};
use crate::errors::Result;
use crate::responsive::keyframes::{KeyframeTable, KeyframeTiming};

/// Quiet window observed before a resize is acted upon.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(150);

/// Fired when a debounced resize lands on a different breakpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakpointChange {
    pub new: String,
    pub previous: String,
}

#[derive(Debug, Clone, Copy)]
struct DebounceState {
    width: f32,
    remaining: Duration,
}

/// Deterministically maps viewport width to one named breakpoint and its
/// settings bundle.
///
/// Resize events arrive through [`notify_resize`](Self::notify_resize) and
/// are debounced: re-entrant events reset the quiet window rather than
/// queue multiple firings, and a window that closes on the same breakpoint
/// fires nothing.
pub struct BreakpointResolver {
    config: Arc<ResponsiveConfig>,
    /// (name, min width), sorted descending by width.
    thresholds: Vec<(String, f32)>,
    keyframes: KeyframeTable,
    current: String,
    debounce: Option<DebounceState>,
}

impl BreakpointResolver {
    pub fn new(config: Arc<ResponsiveConfig>, initial_width: f32) -> Result<Self> {
        config.validate()?;

        let mut thresholds: Vec<(String, f32)> = config
            .breakpoints
            .iter()
            .map(|(name, min)| (name.clone(), *min))
            .collect();
        // Descending by threshold; name as tie-breaker so iteration order
        // of the map never leaks into resolution.
        thresholds.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });

        let keyframes = config.keyframe_table()?;
        let current = Self::resolve_in(&thresholds, initial_width).to_string();

        Ok(Self {
            config,
            thresholds,
            keyframes,
            current,
            debounce: None,
        })
    }

    /// Highest-threshold breakpoint whose minimum is ≤ `width`; the
    /// smallest-threshold entry is the floor when none qualifies.
    #[must_use]
    pub fn resolve(&self, width: f32) -> &str {
        Self::resolve_in(&self.thresholds, width)
    }

    fn resolve_in(thresholds: &[(String, f32)], width: f32) -> &str {
        thresholds
            .iter()
            .find(|(_, min)| *min <= width)
            .or_else(|| thresholds.last())
            .map(|(name, _)| name.as_str())
            .unwrap_or("")
    }

    #[must_use]
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Records a resize event, resetting any in-flight quiet window.
    pub fn notify_resize(&mut self, width: f32) {
        self.debounce = Some(DebounceState {
            width,
            remaining: DEBOUNCE_WINDOW,
        });
    }

    /// Advances the debounce clock; yields at most one change per closed
    /// quiet window, carrying (new, previous) even if many resize events
    /// landed inside it.
    pub fn update(&mut self, dt: Duration) -> Option<BreakpointChange> {
        let state = self.debounce.as_mut()?;
        if state.remaining > dt {
            state.remaining -= dt;
            return None;
        }

        let width = state.width;
        self.debounce = None;

        let resolved = self.resolve(width).to_string();
        if resolved == self.current {
            return None;
        }

        let previous = std::mem::replace(&mut self.current, resolved.clone());
        debug!("viewport {width}px: breakpoint {previous} -> {resolved}");
        Some(BreakpointChange {
            new: resolved,
            previous,
        })
    }

    /// Settings bundle for the active breakpoint, falling back to the
    /// lowest breakpoint's bundle when the entry is absent.
    #[must_use]
    pub fn settings(&self) -> Option<&BreakpointSettings> {
        if let Some(settings) = self.config.settings_for(&self.current) {
            return Some(settings);
        }
        warn!(
            "no settings for breakpoint {:?}; falling back to floor breakpoint",
            self.current
        );
        let floor = self.thresholds.last().map(|(name, _)| name.as_str())?;
        self.config.settings_for(floor)
    }

    /// Named timing triple from the shared table; a miss is logged and
    /// returns `None` so callers fall back to explicit timing.
    #[must_use]
    pub fn keyframe_timing(&self, name: &str) -> Option<&KeyframeTiming> {
        self.keyframes.resolve(name)
    }

    /// The validated keyframe table (for engine construction).
    #[must_use]
    pub fn keyframes(&self) -> &KeyframeTable {
        &self.keyframes
    }
}

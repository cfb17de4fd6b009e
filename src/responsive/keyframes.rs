use std::time::Duration;

use log::warn;
use rustc_hash::FxHashMap;

use crate::animation::easing::Easing;

/// A named, shared (duration, delay, easing) triple.
///
/// Immutable once defined; every responsive step sequence references these
/// by name so breakpoints stay in lockstep on pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyframeTiming {
    pub duration: Duration,
    pub delay: Duration,
    pub easing: Easing,
}

/// The keyframe timing table.
///
/// Lookup misses are a recoverable condition: they are logged, and callers
/// fall back to the step's explicit timing.
#[derive(Debug, Clone, Default)]
pub struct KeyframeTable {
    entries: FxHashMap<String, KeyframeTiming>,
}

impl KeyframeTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, timing: KeyframeTiming) {
        self.entries.insert(name.into(), timing);
    }

    /// Resolves a named timing triple, logging on a miss.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&KeyframeTiming> {
        let found = self.entries.get(name);
        if found.is_none() {
            warn!("keyframe timing {name:?} not found; falling back to explicit step timing");
        }
        found
    }

    /// Silent lookup, for callers that handle absence themselves.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&KeyframeTiming> {
        self.entries.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

use std::cell::Cell;
use std::rc::Rc;

use crate::animation::engine::AnimationQueueEngine;

/// Counts completed steps by observing engine events.
///
/// Composition, not inheritance: the tracker registers a completion
/// observer on the engine and shares a counter cell with it. Dropping the
/// tracker is safe at any time; the engine-side observer keeps counting
/// into the shared cell, which nothing else reads.
#[derive(Debug, Clone)]
pub struct CompletionTracker {
    completed: Rc<Cell<u64>>,
    expected: Option<u64>,
}

impl CompletionTracker {
    /// Attaches a new tracker to an engine.
    #[must_use]
    pub fn attach(engine: &mut AnimationQueueEngine) -> Self {
        let completed = Rc::new(Cell::new(0));
        let cell = Rc::clone(&completed);
        engine.add_completion_observer(move |_event| {
            cell.set(cell.get() + 1);
        });
        Self {
            completed,
            expected: None,
        }
    }

    /// Sets the number of completions considered "finished".
    #[must_use]
    pub fn expect_total(mut self, total: u64) -> Self {
        self.expected = Some(total);
        self
    }

    #[must_use]
    pub fn completed(&self) -> u64 {
        self.completed.get()
    }

    /// True once the expected number of steps completed. Without an
    /// expectation, never finished (pure counter mode).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.expected
            .is_some_and(|expected| self.completed.get() >= expected)
    }
}

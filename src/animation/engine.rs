use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use glam::Vec3;
use log::{debug, trace, warn};
use rustc_hash::FxHashMap;

use crate::animation::step::{AnimationStep, StepDelta};
use crate::errors::Result;
use crate::responsive::keyframes::KeyframeTable;
use crate::scene::stage::GlobeStage;

/// Settle delay between a breakpoint change and the start of its sequence.
pub const SETTLE_DELAY: Duration = Duration::from_millis(120);

/// Immutable sample of every step-animatable property.
///
/// Taken from the stage when a step's interpolation begins; the end sample
/// is the start sample with the step's delta overlaid, so absent delta
/// keys interpolate from a value to itself (a no-op write).
#[derive(Debug, Clone, Copy, PartialEq)]
struct Snapshot {
    scale: Vec3,
    position: Vec3,
    rotation_x: f32,
    rotation_z: f32,
    image_scale: f32,
    rotation_speed: f32,
}

impl Snapshot {
    fn capture(stage: &GlobeStage) -> Self {
        Self {
            scale: stage.transform.scale,
            position: stage.transform.position,
            rotation_x: stage.transform.rotation.x,
            rotation_z: stage.transform.rotation.z,
            image_scale: stage.image_scale(),
            rotation_speed: stage.rotation_speed(),
        }
    }

    fn overlay(&self, delta: &StepDelta) -> Self {
        Self {
            scale: delta.scale.overlay(self.scale),
            position: delta.position.overlay(self.position),
            rotation_x: delta.rotation.x.unwrap_or(self.rotation_x),
            rotation_z: delta.rotation.z.unwrap_or(self.rotation_z),
            image_scale: delta.image_scale.unwrap_or(self.image_scale),
            rotation_speed: delta.rotation_speed.unwrap_or(self.rotation_speed),
        }
    }

    fn lerp(start: &Self, end: &Self, t: f32) -> Self {
        Self {
            scale: start.scale.lerp(end.scale, t),
            position: start.position.lerp(end.position, t),
            rotation_x: start.rotation_x + (end.rotation_x - start.rotation_x) * t,
            rotation_z: start.rotation_z + (end.rotation_z - start.rotation_z) * t,
            image_scale: start.image_scale + (end.image_scale - start.image_scale) * t,
            rotation_speed: start.rotation_speed
                + (end.rotation_speed - start.rotation_speed) * t,
        }
    }
}

/// Start/end pair of one in-flight interpolation.
#[derive(Debug, Clone, Copy)]
struct InterpolationSpan {
    start: Snapshot,
    end: Snapshot,
}

struct ActiveStep {
    step: AnimationStep,
    elapsed: Duration,
    /// Created lazily when the delay expires, so the start snapshot sees
    /// any spin-driven mutation that happened during the delay.
    span: Option<InterpolationSpan>,
}

/// Notification payload passed to completion observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepCompleted {
    /// Monotonic index of the completed step within this engine's lifetime.
    pub step_index: u64,
}

struct PendingSequence {
    remaining: Duration,
    breakpoint: String,
}

/// Strictly-ordered cooperative animation scheduler.
///
/// Runs one interpolation at a time against a shared [`GlobeStage`],
/// advancing on explicit wall-clock deltas; durations are honored in time,
/// not frame counts, so frame-rate variance changes smoothness only.
///
/// Ownership: the engine exclusively owns its queue and current-step
/// state. It holds no reference to the stage; the driver passes it by
/// `&mut` once per frame, which is what makes the whole core lock-free.
pub struct AnimationQueueEngine {
    queue: VecDeque<AnimationStep>,
    current: Option<ActiveStep>,

    keyframes: KeyframeTable,
    responsive: bool,

    sequences: FxHashMap<String, Vec<AnimationStep>>,
    pending: Option<PendingSequence>,

    observers: Vec<Rc<dyn Fn(StepCompleted)>>,
    completed_steps: u64,

    // Last-seen guards for the side channels. Exact float equality is
    // intentional: a plateauing tween produces bit-identical values, and
    // suppressing those writes is the point of the guard.
    last_image_scale: Option<f32>,
    last_rotation_speed: Option<f32>,
}

impl AnimationQueueEngine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            current: None,
            keyframes: KeyframeTable::new(),
            responsive: false,
            sequences: FxHashMap::default(),
            pending: None,
            observers: Vec::new(),
            completed_steps: 0,
            last_image_scale: None,
            last_rotation_speed: None,
        }
    }

    /// Enables responsive mode with the given shared timing table.
    #[must_use]
    pub fn with_keyframes(mut self, keyframes: KeyframeTable) -> Self {
        self.keyframes = keyframes;
        self.responsive = true;
        self
    }

    pub fn set_responsive(&mut self, responsive: bool) {
        self.responsive = responsive;
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.current.is_none() && self.queue.is_empty() && self.pending.is_none()
    }

    #[must_use]
    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    /// Registers an observer fired after every step completion (after the
    /// step's own callback). Composition seam for trackers; no subclassing.
    pub fn add_completion_observer(&mut self, observer: impl Fn(StepCompleted) + 'static) {
        self.observers.push(Rc::new(observer));
    }

    // ========================================================================
    // Queueing
    // ========================================================================

    /// Validates and appends a step; playback of the queue head begins on
    /// the next `update` tick if the engine is idle. Chainable via `?`.
    ///
    /// In responsive mode a present `keyframe_ref` is resolved here,
    /// before queueing, overriding the step's explicit timing; a miss is
    /// logged and the explicit timing stands.
    pub fn enqueue(&mut self, mut step: AnimationStep) -> Result<&mut Self> {
        step.delta.validate()?;

        if self.responsive {
            if let Some(name) = step.keyframe_ref.clone() {
                if let Some(timing) = self.keyframes.resolve(&name) {
                    step.duration = timing.duration;
                    step.delay = timing.delay;
                    step.easing = timing.easing;
                }
            }
        }

        self.queue.push_back(step);
        Ok(self)
    }

    /// Enqueues every step in order, preserving FIFO semantics.
    pub fn play_sequence(&mut self, steps: impl IntoIterator<Item = AnimationStep>) -> Result<()> {
        for step in steps {
            self.enqueue(step)?;
        }
        Ok(())
    }

    /// Stores the sequence played when `on_breakpoint_change` lands on the
    /// named breakpoint.
    pub fn register_sequence(&mut self, breakpoint: impl Into<String>, steps: Vec<AnimationStep>) {
        self.sequences.insert(breakpoint.into(), steps);
    }

    // ========================================================================
    // Playback
    // ========================================================================

    /// Advances playback by the caller-supplied wall-clock delta.
    ///
    /// Must be invoked once per rendered frame; a no-op when idle.
    /// Leftover time after a step completes carries into the next queued
    /// step within the same call, so zero-duration steps complete on the
    /// tick that starts them.
    pub fn update(&mut self, dt: Duration, stage: &mut GlobeStage) {
        let mut dt = dt;

        if let Some(pending) = self.pending.as_mut() {
            if pending.remaining > dt {
                pending.remaining -= dt;
                return;
            }
        }
        if let Some(pending) = self.pending.take() {
            dt -= pending.remaining;
            self.begin_registered(&pending.breakpoint);
        }

        loop {
            if self.current.is_none() {
                let Some(step) = self.queue.pop_front() else {
                    break;
                };
                trace!("starting animation step: {step:?}");
                self.current = Some(ActiveStep {
                    step,
                    elapsed: Duration::ZERO,
                    span: None,
                });
            }

            match self.advance_current(dt, stage) {
                Some(leftover) => dt = leftover,
                None => break,
            }
        }

        if self.is_idle() {
            trace!("animation queue idle");
        }
    }

    /// Cancels the in-flight interpolation and discards all queued steps.
    ///
    /// The stage stays frozen at its last interpolated value, and the
    /// cancelled step's completion callback is guaranteed never to fire.
    pub fn stop(&mut self) {
        self.current = None;
        self.queue.clear();
        self.pending = None;
    }

    /// Stops playback and arms the settle delay, after which the sequence
    /// registered for the new breakpoint begins.
    pub fn on_breakpoint_change(&mut self, new: &str, old: &str) {
        debug!("breakpoint change {old} -> {new}: restarting sequence");
        self.stop();
        if self.sequences.contains_key(new) {
            self.pending = Some(PendingSequence {
                remaining: SETTLE_DELAY,
                breakpoint: new.to_string(),
            });
        } else {
            warn!("no sequence registered for breakpoint {new:?}; engine stays idle");
        }
    }

    /// Releases queued steps, registered sequences and observers.
    pub fn dispose(&mut self) {
        self.stop();
        self.sequences.clear();
        self.observers.clear();
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn begin_registered(&mut self, breakpoint: &str) {
        let Some(steps) = self.sequences.get(breakpoint).cloned() else {
            return;
        };
        // Steps were validated when the sequence was registered.
        if let Err(err) = self.play_sequence(steps) {
            warn!("registered sequence for {breakpoint:?} failed to queue: {err}");
        }
    }

    /// Advances the current step. Returns the leftover delta when the step
    /// completed, `None` while it is still in flight.
    fn advance_current(&mut self, dt: Duration, stage: &mut GlobeStage) -> Option<Duration> {
        let (value, completed_leftover) = {
            let active = self.current.as_mut().expect("current step present");
            active.elapsed += dt;

            let delay = active.step.delay;
            if active.elapsed < delay {
                return None;
            }

            if active.span.is_none() {
                let start = Snapshot::capture(stage);
                let end = start.overlay(&active.step.delta);
                active.span = Some(InterpolationSpan { start, end });
            }
            let span = active.span.as_ref().expect("span just created");

            let into = active.elapsed - delay;
            let duration = active.step.duration;
            if into >= duration {
                (span.end, Some(into - duration))
            } else {
                let t = into.as_secs_f32() / duration.as_secs_f32();
                let eased = active.step.easing.apply(t);
                (Snapshot::lerp(&span.start, &span.end, eased), None)
            }
        };

        self.write_back(&value, stage);

        let leftover = completed_leftover?;
        let finished = self.current.take().expect("current step present");
        if let Some(callback) = finished.step.on_complete {
            callback();
        }
        self.completed_steps += 1;
        let event = StepCompleted {
            step_index: self.completed_steps,
        };
        for observer in &self.observers {
            observer(event);
        }
        trace!("animation step {} complete", event.step_index);
        Some(leftover)
    }

    /// Writes an interpolated sample onto the stage.
    ///
    /// Scale and position are written unconditionally; rotation touches
    /// only x and z (y belongs to the continuous spin); the side channels
    /// go through last-seen guards so an unchanged multiplier never
    /// retriggers the downstream morph pass.
    fn write_back(&mut self, value: &Snapshot, stage: &mut GlobeStage) {
        stage.transform.scale = value.scale;
        stage.transform.position = value.position;
        stage.transform.rotation.x = value.rotation_x;
        stage.transform.rotation.z = value.rotation_z;

        if self.last_image_scale != Some(value.image_scale) {
            self.last_image_scale = Some(value.image_scale);
            stage.set_image_scale(value.image_scale);
        }
        if self.last_rotation_speed != Some(value.rotation_speed) {
            self.last_rotation_speed = Some(value.rotation_speed);
            stage.set_rotation_speed(value.rotation_speed);
        }
    }
}

impl Default for AnimationQueueEngine {
    fn default() -> Self {
        Self::new()
    }
}

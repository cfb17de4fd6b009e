//! Animation Engine Tests
//!
//! Tests for:
//! - Easing table resolution (fail-fast on unknown names)
//! - AnimationStep validation at enqueue time
//! - Partial-update invariant (absent delta keys keep their values)
//! - Queue sequencing, delays, zero-duration steps
//! - stop() cancellation semantics
//! - Keyframe-reference timing override in responsive mode
//! - Side-channel last-seen guards
//! - CompletionTracker composition

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use glam::Vec3;

use gyre::animation::engine::SETTLE_DELAY;
use gyre::animation::step::StepDelta;
use gyre::animation::{AnimationQueueEngine, AnimationStep, CompletionTracker, Easing};
use gyre::errors::GyreError;
use gyre::responsive::{KeyframeTable, KeyframeTiming};
use gyre::scene::GlobeStage;

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

// ============================================================================
// Easing: name resolution and curve shape
// ============================================================================

#[test]
fn easing_known_names_resolve() {
    for name in [
        "linear",
        "quad-in",
        "quad-out",
        "quad-in-out",
        "cubic-in",
        "cubic-out",
        "cubic-in-out",
        "sine-in",
        "sine-out",
        "sine-in-out",
        "expo-in",
        "expo-out",
        "expo-in-out",
        "elastic-out",
        "back-out",
    ] {
        let easing = Easing::from_name(name).expect("known name must resolve");
        assert_eq!(easing.name(), name);
    }
}

#[test]
fn easing_unknown_name_fails_fast() {
    let err = Easing::from_name("power2.inOut").unwrap_err();
    assert!(
        matches!(err, GyreError::UnknownEasing(name) if name == "power2.inOut"),
        "unknown easing must surface immediately, not default"
    );
}

#[test]
fn easing_endpoints_exact() {
    for easing in [
        Easing::Linear,
        Easing::QuadInOut,
        Easing::CubicOut,
        Easing::SineInOut,
        Easing::ExpoIn,
        Easing::ExpoInOut,
        Easing::ElasticOut,
        Easing::BackOut,
    ] {
        assert!(
            approx(easing.apply(0.0), 0.0),
            "{}: apply(0) != 0",
            easing.name()
        );
        assert!(
            approx(easing.apply(1.0), 1.0),
            "{}: apply(1) != 1",
            easing.name()
        );
    }
}

#[test]
fn easing_linear_midpoint() {
    assert!(approx(Easing::Linear.apply(0.5), 0.5));
    assert!(approx(Easing::QuadIn.apply(0.5), 0.25));
    assert!(approx(Easing::QuadOut.apply(0.5), 0.75));
}

// ============================================================================
// Enqueue validation
// ============================================================================

#[test]
fn enqueue_rejects_non_finite_delta() {
    let mut engine = AnimationQueueEngine::new();
    let step = AnimationStep::new().scale(Vec3::new(f32::NAN, 1.0, 1.0));
    let err = engine.enqueue(step).map(|_| ()).unwrap_err();
    assert!(matches!(err, GyreError::InvalidParameter { .. }));
    assert_eq!(engine.queued_len(), 0, "failed enqueue must not queue");
}

#[test]
fn enqueue_chains() {
    let mut engine = AnimationQueueEngine::new();
    engine
        .enqueue(AnimationStep::new().duration(ms(100)))
        .and_then(|engine| engine.enqueue(AnimationStep::new().duration(ms(100))))
        .expect("valid steps enqueue");
    assert_eq!(engine.queued_len(), 2);
}

// ============================================================================
// Partial-update invariant
// ============================================================================

#[test]
fn absent_delta_groups_keep_values() {
    let mut engine = AnimationQueueEngine::new();
    let mut stage = GlobeStage::new();
    stage.transform.scale = Vec3::new(2.0, 2.0, 2.0);
    stage.transform.position = Vec3::new(1.0, -3.0, 5.0);
    stage.transform.rotation = Vec3::new(0.1, 0.2, 0.3);

    // Only position moves; everything else must be untouched, exactly.
    engine
        .enqueue(
            AnimationStep::new()
                .position(Vec3::new(0.0, 0.0, 0.0))
                .duration(ms(200)),
        )
        .unwrap();
    engine.update(ms(100), &mut stage);
    engine.update(ms(100), &mut stage);

    assert_eq!(stage.transform.scale, Vec3::new(2.0, 2.0, 2.0));
    assert_eq!(stage.transform.rotation.x, 0.1);
    assert_eq!(stage.transform.rotation.z, 0.3);
    assert_eq!(stage.transform.position, Vec3::ZERO);
}

#[test]
fn per_axis_partial_delta() {
    let mut engine = AnimationQueueEngine::new();
    let mut stage = GlobeStage::new();
    stage.transform.scale = Vec3::new(1.0, 2.0, 3.0);

    let mut step = AnimationStep::new().duration(ms(100));
    step.delta = StepDelta {
        scale: gyre::animation::AxisDelta {
            x: Some(4.0),
            y: None,
            z: None,
        },
        ..StepDelta::default()
    };
    engine.enqueue(step).unwrap();
    engine.update(ms(100), &mut stage);

    assert!(approx(stage.transform.scale.x, 4.0));
    assert_eq!(stage.transform.scale.y, 2.0, "absent axis must not move");
    assert_eq!(stage.transform.scale.z, 3.0, "absent axis must not move");
}

#[test]
fn step_rotation_never_touches_y() {
    let mut engine = AnimationQueueEngine::new();
    let mut stage = GlobeStage::new();
    stage.transform.rotation.y = 1.25;

    engine
        .enqueue(
            AnimationStep::new()
                .rotation_x(0.5)
                .rotation_z(-0.5)
                .duration(ms(100)),
        )
        .unwrap();
    engine.update(ms(50), &mut stage);
    engine.update(ms(50), &mut stage);

    assert_eq!(
        stage.transform.rotation.y, 1.25,
        "y is reserved for the continuous spin"
    );
    assert!(approx(stage.transform.rotation.x, 0.5));
    assert!(approx(stage.transform.rotation.z, -0.5));
}

// ============================================================================
// Interpolation over time
// ============================================================================

#[test]
fn linear_interpolation_midpoint() {
    let mut engine = AnimationQueueEngine::new();
    let mut stage = GlobeStage::new();

    engine
        .enqueue(
            AnimationStep::new()
                .position(Vec3::new(10.0, 0.0, 0.0))
                .duration(ms(1000)),
        )
        .unwrap();

    engine.update(ms(500), &mut stage);
    assert!(
        approx(stage.transform.position.x, 5.0),
        "halfway through a linear tween, got {}",
        stage.transform.position.x
    );
}

#[test]
fn delay_defers_interpolation() {
    let mut engine = AnimationQueueEngine::new();
    let mut stage = GlobeStage::new();

    engine
        .enqueue(
            AnimationStep::new()
                .position(Vec3::new(10.0, 0.0, 0.0))
                .delay(ms(200))
                .duration(ms(100)),
        )
        .unwrap();

    engine.update(ms(150), &mut stage);
    assert_eq!(
        stage.transform.position.x, 0.0,
        "nothing moves during the delay"
    );

    engine.update(ms(100), &mut stage);
    assert!(
        approx(stage.transform.position.x, 5.0),
        "50ms into the 100ms tween, got {}",
        stage.transform.position.x
    );
}

#[test]
fn snapshot_taken_after_delay() {
    // The start snapshot must see mutations that happen during the delay
    // (the continuous spin keeps running while a step waits).
    let mut engine = AnimationQueueEngine::new();
    let mut stage = GlobeStage::new();

    engine
        .enqueue(
            AnimationStep::new()
                .rotation_x(1.0)
                .delay(ms(100))
                .duration(ms(100)),
        )
        .unwrap();
    engine.update(ms(50), &mut stage);

    // External mutation mid-delay.
    stage.transform.rotation.x = 0.5;

    engine.update(ms(100), &mut stage); // 50ms into the tween
    assert!(
        approx(stage.transform.rotation.x, 0.75),
        "interpolation must start from the post-delay value, got {}",
        stage.transform.rotation.x
    );
}

// ============================================================================
// Queue sequencing
// ============================================================================

#[test]
fn three_step_boundaries_fire_in_order() {
    let mut engine = AnimationQueueEngine::new();
    let mut stage = GlobeStage::new();

    let order: Rc<RefCell<Vec<u32>>> = Rc::new(RefCell::new(Vec::new()));
    for (index, duration) in [0u64, 500, 300].into_iter().enumerate() {
        let order = Rc::clone(&order);
        engine
            .enqueue(
                AnimationStep::new()
                    .duration(ms(duration))
                    .on_complete(move || order.borrow_mut().push(index as u32)),
            )
            .unwrap();
    }

    engine.update(ms(0), &mut stage);
    assert_eq!(*order.borrow(), vec![0], "zero-duration step completes on its starting tick");

    engine.update(ms(500), &mut stage);
    assert_eq!(*order.borrow(), vec![0, 1]);

    engine.update(ms(300), &mut stage);
    assert_eq!(*order.borrow(), vec![0, 1, 2]);

    assert!(engine.is_idle(), "queue must be empty after the third step");
}

#[test]
fn leftover_time_carries_into_next_step() {
    let mut engine = AnimationQueueEngine::new();
    let mut stage = GlobeStage::new();

    engine
        .enqueue(AnimationStep::new().duration(ms(100)))
        .unwrap();
    engine
        .enqueue(
            AnimationStep::new()
                .position(Vec3::new(10.0, 0.0, 0.0))
                .duration(ms(100)),
        )
        .unwrap();

    // 150ms: first step completes, second is 50ms in.
    engine.update(ms(150), &mut stage);
    assert!(
        approx(stage.transform.position.x, 5.0),
        "leftover 50ms must flow into the second step, got {}",
        stage.transform.position.x
    );
}

// ============================================================================
// stop()
// ============================================================================

#[test]
fn stop_freezes_and_discards() {
    let mut engine = AnimationQueueEngine::new();
    let mut stage = GlobeStage::new();

    let fired = Rc::new(Cell::new(false));
    let fired_clone = Rc::clone(&fired);
    engine
        .enqueue(
            AnimationStep::new()
                .position(Vec3::new(10.0, 0.0, 0.0))
                .duration(ms(1000))
                .on_complete(move || fired_clone.set(true)),
        )
        .unwrap();
    engine
        .enqueue(AnimationStep::new().scale(Vec3::splat(3.0)).duration(ms(100)))
        .unwrap();

    engine.update(ms(500), &mut stage);
    engine.stop();

    let frozen = stage.transform.position;
    engine.update(ms(1000), &mut stage);
    engine.update(ms(1000), &mut stage);

    assert_eq!(
        stage.transform.position, frozen,
        "stop() then update() must produce no further state change"
    );
    assert_eq!(stage.transform.scale, Vec3::ONE, "queued step discarded");
    assert!(!fired.get(), "a cancelled step's callback must never fire");
    assert!(engine.is_idle());
}

// ============================================================================
// Keyframe-reference timing override
// ============================================================================

fn phase_table() -> KeyframeTable {
    let mut table = KeyframeTable::new();
    table.insert(
        "phase2",
        KeyframeTiming {
            duration: ms(800),
            delay: ms(0),
            easing: Easing::QuadOut,
        },
    );
    table
}

#[test]
fn keyframe_ref_wins_when_responsive() {
    let mut engine = AnimationQueueEngine::new().with_keyframes(phase_table());
    let mut stage = GlobeStage::new();

    engine
        .enqueue(
            AnimationStep::new()
                .position(Vec3::new(10.0, 0.0, 0.0))
                .duration(ms(1))
                .keyframe("phase2"),
        )
        .unwrap();

    // With the table's 800ms duration, 1ms in the tween has barely moved.
    engine.update(ms(1), &mut stage);
    assert!(
        stage.transform.position.x < 1.0,
        "table duration must govern, got x={}",
        stage.transform.position.x
    );
}

#[test]
fn explicit_timing_wins_when_not_responsive() {
    let mut engine = AnimationQueueEngine::new();
    let mut stage = GlobeStage::new();

    engine
        .enqueue(
            AnimationStep::new()
                .position(Vec3::new(10.0, 0.0, 0.0))
                .duration(ms(1))
                .keyframe("phase2"),
        )
        .unwrap();

    engine.update(ms(1), &mut stage);
    assert!(
        approx(stage.transform.position.x, 10.0),
        "explicit 1ms duration must govern, got x={}",
        stage.transform.position.x
    );
}

#[test]
fn missing_keyframe_falls_back_to_explicit() {
    let mut engine = AnimationQueueEngine::new().with_keyframes(phase_table());
    let mut stage = GlobeStage::new();

    engine
        .enqueue(
            AnimationStep::new()
                .position(Vec3::new(10.0, 0.0, 0.0))
                .duration(ms(100))
                .keyframe("no-such-phase"),
        )
        .unwrap();

    engine.update(ms(100), &mut stage);
    assert!(
        approx(stage.transform.position.x, 10.0),
        "missing keyframe is recoverable: explicit timing stands"
    );
}

// ============================================================================
// Side channels
// ============================================================================

#[test]
fn image_scale_propagates_through_guard() {
    let mut engine = AnimationQueueEngine::new();
    let mut stage = GlobeStage::new();

    engine
        .enqueue(AnimationStep::new().image_scale(0.5).duration(ms(100)))
        .unwrap();
    engine.update(ms(100), &mut stage);

    assert!(approx(stage.image_scale(), 0.5));
}

#[test]
fn unchanged_side_channel_not_rewritten() {
    let mut engine = AnimationQueueEngine::new();
    let mut stage = GlobeStage::new();

    // A step that does not touch image_scale: after the first write the
    // interpolated value is bit-identical every tick, so the guard must
    // suppress further writes.
    engine
        .enqueue(
            AnimationStep::new()
                .position(Vec3::new(1.0, 0.0, 0.0))
                .duration(ms(1000)),
        )
        .unwrap();

    engine.update(ms(100), &mut stage);
    let version_after_first = stage.image_scale_version();
    for _ in 0..5 {
        engine.update(ms(100), &mut stage);
    }
    assert_eq!(
        stage.image_scale_version(),
        version_after_first,
        "plateaued side-channel values must not be rewritten every tick"
    );
}

// ============================================================================
// Breakpoint-change sequencing
// ============================================================================

#[test]
fn breakpoint_change_plays_registered_sequence_after_settle() {
    let mut engine = AnimationQueueEngine::new();
    let mut stage = GlobeStage::new();

    engine.register_sequence(
        "desktop",
        vec![AnimationStep::new()
            .scale(Vec3::splat(2.0))
            .duration(ms(100))],
    );

    engine
        .enqueue(
            AnimationStep::new()
                .position(Vec3::new(10.0, 0.0, 0.0))
                .duration(ms(1000)),
        )
        .unwrap();
    engine.update(ms(100), &mut stage);

    engine.on_breakpoint_change("desktop", "mobile");
    assert!(!engine.is_idle(), "settle delay is pending");

    // Inside the settle window nothing plays.
    engine.update(SETTLE_DELAY / 2, &mut stage);
    assert_eq!(stage.transform.scale, Vec3::ONE);

    // Past the settle window the registered sequence runs.
    engine.update(SETTLE_DELAY, &mut stage);
    engine.update(ms(100), &mut stage);
    assert!(
        approx(stage.transform.scale.x, 2.0),
        "registered sequence must play after settle, scale.x={}",
        stage.transform.scale.x
    );
}

// ============================================================================
// CompletionTracker (composition over events)
// ============================================================================

#[test]
fn tracker_counts_completions() {
    let mut engine = AnimationQueueEngine::new();
    let mut stage = GlobeStage::new();
    let tracker = CompletionTracker::attach(&mut engine).expect_total(2);

    engine
        .enqueue(AnimationStep::new().duration(ms(100)))
        .unwrap();
    engine
        .enqueue(AnimationStep::new().duration(ms(100)))
        .unwrap();

    engine.update(ms(100), &mut stage);
    assert_eq!(tracker.completed(), 1);
    assert!(!tracker.is_finished());

    engine.update(ms(100), &mut stage);
    assert_eq!(tracker.completed(), 2);
    assert!(tracker.is_finished());
}

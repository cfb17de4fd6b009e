//! Headless driver for the globe gallery core.
//!
//! Wires the responsive resolver, the animation queue and the projector
//! together the way a render loop would, then simulates a resize from
//! desktop to mobile. Run with `RUST_LOG=debug` to watch the morph passes
//! and breakpoint transitions.

use std::sync::Arc;
use std::time::Duration;

use gyre::{
    AnimationQueueEngine, BatchProjectionOptions, BreakpointResolver, CompletionTracker,
    GlobeStage, MemoryImageSource, ResponsiveConfig, SphericalProjector, Timer,
};

const CONFIG_JSON: &str = r#"{
    "breakpoints": { "mobile": 0, "tablet": 768, "desktop": 1024 },
    "keyframes": {
        "intro":  { "duration_ms": 1200, "delay_ms": 200, "easing": "cubic-in-out" },
        "settle": { "duration_ms": 600,  "easing": "quad-out" }
    },
    "settings": {
        "mobile": {
            "globe": { "scale": 0.7, "position": [0, -1.5, 0], "rotation_speed": 0.04, "image_scale": 0.8 },
            "sequence": [
                { "scale": { "x": 0.7, "y": 0.7, "z": 0.7 }, "position": { "y": -1.5 }, "keyframe": "intro" },
                { "image_scale": 0.8, "rotation_speed": 0.04, "keyframe": "settle" }
            ]
        },
        "desktop": {
            "globe": { "scale": 1.0, "position": [0, 0, 0], "rotation_speed": 0.06, "image_scale": 1.0 },
            "sequence": [
                { "scale": { "x": 1.0, "y": 1.0, "z": 1.0 }, "position": { "y": 0.0 }, "keyframe": "intro" },
                { "image_scale": 1.0, "rotation_speed": 0.06, "keyframe": "settle" }
            ]
        }
    }
}"#;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // Configuration: loaded once, shared read-only from here on.
    let config = Arc::new(ResponsiveConfig::from_json(CONFIG_JSON)?);
    let mut resolver = BreakpointResolver::new(Arc::clone(&config), 1280.0)?;

    let mut engine = AnimationQueueEngine::new().with_keyframes(resolver.keyframes().clone());
    for breakpoint in config.breakpoints.keys() {
        if let Some(sequence) = config.sequence_for(breakpoint) {
            let steps = sequence
                .iter()
                .map(gyre::StepConfig::to_step)
                .collect::<gyre::Result<Vec<_>>>()?;
            engine.register_sequence(breakpoint.clone(), steps);
        }
    }
    let tracker = CompletionTracker::attach(&mut engine);

    // Project a small gallery onto the sphere.
    let urls: Vec<String> = (0..14).map(|i| format!("gallery/photo-{i:02}.jpg")).collect();
    let mut source = MemoryImageSource::new();
    for (i, url) in urls.iter().enumerate() {
        // Mixed portrait/landscape aspect ratios.
        if i % 3 == 0 {
            source.insert(url.clone(), 900, 1600);
        } else {
            source.insert(url.clone(), 1600, 900);
        }
    }

    let mut projector = SphericalProjector::new(12.0, 24)?;
    let handles = pollster::block_on(projector.project_images_spherically(
        &source,
        &urls,
        &BatchProjectionOptions::default(),
    ))?;
    let projected = handles.iter().filter(|h| h.is_ok()).count();
    println!("projected {projected}/{} images", urls.len());

    // Kick off the initial sequence for the starting breakpoint.
    let initial = resolver.current().to_string();
    if let Some(sequence) = config.sequence_for(&initial) {
        let steps = sequence
            .iter()
            .map(gyre::StepConfig::to_step)
            .collect::<gyre::Result<Vec<_>>>()?;
        engine.play_sequence(steps)?;
    }

    // Simulated render loop at a fixed 16ms frame; the wall-clock timer
    // just measures how long the simulation itself took.
    let mut stage = GlobeStage::new();
    let mut timer = Timer::new();
    let dt = Duration::from_millis(16);
    let mut seen_scale_version = stage.image_scale_version();

    for frame in 0..600u32 {
        timer.tick();
        // Halfway through, the viewport shrinks to phone width.
        if frame == 300 {
            resolver.notify_resize(430.0);
        }

        if let Some(change) = resolver.update(dt) {
            engine.on_breakpoint_change(&change.new, &change.previous);
        }

        engine.update(dt, &mut stage);
        stage.advance_spin(dt);

        // Side channel -> morph pass, only when the multiplier moved.
        if stage.image_scale_version() != seen_scale_version {
            seen_scale_version = stage.image_scale_version();
            projector.set_size_multiplier(stage.image_scale())?;
        }

        stage.transform.update_local_matrix();
    }

    println!(
        "after {} frames ({:?} wall): breakpoint={} scale={:.2} image_scale={:.2} steps_completed={}",
        timer.frame_count,
        timer.elapsed,
        resolver.current(),
        stage.transform.scale.x,
        projector.size_multiplier(),
        tracker.completed(),
    );

    engine.dispose();
    projector.dispose();
    Ok(())
}

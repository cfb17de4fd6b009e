//! Distribution Planner Tests
//!
//! Tests for:
//! - Exactly-once placement (no duplicates, no omissions)
//! - Equatorial-density band capacities
//! - Deterministic reproducibility of the jittered layout
//! - Option validation

use gyre::errors::GyreError;
use gyre::projection::{DistributionOptions, DistributionPlanner};

fn planner() -> DistributionPlanner {
    DistributionPlanner::new(DistributionOptions::default()).unwrap()
}

// ============================================================================
// Exactly-once placement
// ============================================================================

#[test]
fn places_29_images_exactly_once() {
    let placements = planner().plan(29);
    assert_eq!(placements.len(), 29, "every image placed, none dropped");

    let mut quantized: Vec<(i64, i64)> = placements
        .iter()
        .map(|p| ((p.lat * 10_000.0) as i64, (p.lng * 10_000.0) as i64))
        .collect();
    quantized.sort_unstable();
    quantized.dedup();
    assert_eq!(quantized.len(), 29, "no two images share a placement");
}

#[test]
fn empty_input_yields_empty_plan() {
    assert!(planner().plan(0).is_empty());
}

#[test]
fn single_image_lands_on_equator_band() {
    let placements = planner().plan(1);
    assert_eq!(placements.len(), 1);
    assert!(
        placements[0].lat.abs() <= DistributionOptions::default().latitude_jitter,
        "a single image belongs to the equator band, lat = {}",
        placements[0].lat
    );
}

#[test]
fn all_latitudes_within_extent_plus_jitter() {
    let opts = DistributionOptions::default();
    let bound = opts.latitude_extent + opts.latitude_jitter;
    for p in planner().plan(40) {
        assert!(
            p.lat.abs() <= bound + 1e-3,
            "latitude {} beyond extent+jitter {bound}",
            p.lat
        );
        assert!((-180.0..=180.0).contains(&p.lng), "longitude {}", p.lng);
    }
}

// ============================================================================
// Equatorial density
// ============================================================================

#[test]
fn polar_bands_hold_fewer_images_than_equator() {
    let opts = DistributionOptions::default();
    let placements = planner().plan(29);

    // Band centers are at least latitude_extent/3 apart for 29 images
    // (6 bands), while jitter is only a few degrees, so membership is
    // recoverable from the latitude alone.
    let near = |p: &gyre::projection::GeoPosition, center: f32| {
        (p.lat - center).abs() <= opts.latitude_jitter + 1e-3
    };

    let equator = placements.iter().filter(|p| near(p, 0.0)).count();
    let polar = placements
        .iter()
        .filter(|p| near(p, opts.latitude_extent))
        .count();

    assert!(equator > 0 && polar > 0, "both bands must be populated");
    assert!(
        polar < equator,
        "cos(latitude) capacity: polar band {polar} must hold strictly fewer than equator {equator}"
    );
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn identical_inputs_reproduce_identical_layout() {
    let a = planner().plan(23);
    let b = planner().plan(23);
    assert_eq!(a.len(), b.len());
    for (pa, pb) in a.iter().zip(&b) {
        assert_eq!(pa.lat.to_bits(), pb.lat.to_bits(), "jitter must be seeded, not random");
        assert_eq!(pa.lng.to_bits(), pb.lng.to_bits());
    }
}

#[test]
fn jitter_varies_between_slots() {
    let placements = planner().plan(9);
    // With a 3-band layout the equator band holds several slots; their
    // longitudes must not be an exact regular grid.
    let on_grid = placements
        .iter()
        .filter(|p| (p.lng.rem_euclid(1.0)).abs() < 1e-6)
        .count();
    assert!(
        on_grid < placements.len(),
        "deterministic jitter should still look organic"
    );
}

// ============================================================================
// Option validation
// ============================================================================

#[test]
fn invalid_options_rejected() {
    let zero_bands = DistributionOptions {
        max_bands: 0,
        ..DistributionOptions::default()
    };
    assert!(matches!(
        DistributionPlanner::new(zero_bands).unwrap_err(),
        GyreError::InvalidParameter { .. }
    ));

    let bad_extent = DistributionOptions {
        latitude_extent: 90.0,
        ..DistributionOptions::default()
    };
    assert!(DistributionPlanner::new(bad_extent).is_err());

    let negative_jitter = DistributionOptions {
        latitude_jitter: -1.0,
        ..DistributionOptions::default()
    };
    assert!(DistributionPlanner::new(negative_jitter).is_err());
}

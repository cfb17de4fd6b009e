use log::debug;
use smallvec::SmallVec;
use xxhash_rust::xxh3::xxh3_64;

use crate::errors::{GyreError, Result};
use crate::projection::GeoPosition;

/// Hard ceiling on latitude bands; beyond this the layout reads as noise.
const MAX_BAND_LIMIT: usize = 7;

/// Tuning for the band-based spherical distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionOptions {
    /// Upper bound on latitude bands, capped at 7.
    pub max_bands: usize,
    /// Capacity floor per band, regardless of circumference.
    pub min_per_band: usize,
    /// Scales every band's nominal capacity in the first pass.
    pub capacity_multiplier: f32,
    /// Larger multiplier used by the top-up pass for leftovers.
    pub topup_multiplier: f32,
    /// Maximum absolute band latitude in degrees.
    pub latitude_extent: f32,
    /// Jitter amplitude applied to each placement's latitude, degrees.
    pub latitude_jitter: f32,
    /// Jitter amplitude applied to each placement's longitude, degrees.
    pub longitude_jitter: f32,
}

impl Default for DistributionOptions {
    fn default() -> Self {
        Self {
            max_bands: MAX_BAND_LIMIT,
            min_per_band: 1,
            capacity_multiplier: 1.0,
            topup_multiplier: 1.5,
            latitude_extent: 60.0,
            latitude_jitter: 3.0,
            longitude_jitter: 6.0,
        }
    }
}

impl DistributionOptions {
    fn validate(&self) -> Result<()> {
        if self.max_bands == 0 {
            return Err(GyreError::invalid("distribution max_bands", 0.0));
        }
        for (context, v) in [
            ("distribution capacity_multiplier", self.capacity_multiplier),
            ("distribution topup_multiplier", self.topup_multiplier),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(GyreError::invalid(context, f64::from(v)));
            }
        }
        if !self.latitude_extent.is_finite() || !(0.0..90.0).contains(&self.latitude_extent) {
            return Err(GyreError::invalid(
                "distribution latitude_extent",
                f64::from(self.latitude_extent),
            ));
        }
        for (context, v) in [
            ("distribution latitude_jitter", self.latitude_jitter),
            ("distribution longitude_jitter", self.longitude_jitter),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(GyreError::invalid(context, f64::from(v)));
            }
        }
        Ok(())
    }
}

/// Plans an even, organic-looking placement of N images over the sphere.
///
/// Everything is deterministic: band layout follows from N and the
/// options, and the jitter is hash-seeded by band and slot index, so
/// identical inputs reproduce the identical layout.
#[derive(Debug)]
pub struct DistributionPlanner {
    options: DistributionOptions,
}

impl DistributionPlanner {
    pub fn new(options: DistributionOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    /// Places `count` images. Every image is placed exactly once.
    ///
    /// Bands start at the equator and alternate outward, so the first
    /// images land where the viewer looks; each band's capacity follows
    /// its circumference (`cos(latitude)`), leftovers go through a top-up
    /// pass under the larger multiplier, and any remainder lands on the
    /// equator band.
    #[must_use]
    pub fn plan(&self, count: usize) -> Vec<GeoPosition> {
        if count == 0 {
            return Vec::new();
        }

        let opts = &self.options;
        let latitudes = self.band_latitudes(count);
        let bands = latitudes.len();
        let nominal = (count as f32 / bands as f32).ceil();

        let capacity = |latitude: f32, multiplier: f32| -> usize {
            let raw = (nominal * latitude.to_radians().cos() * multiplier).round() as isize;
            raw.max(opts.min_per_band as isize) as usize
        };

        let mut counts: SmallVec<[usize; 8]> = SmallVec::from_elem(0, bands);
        let mut remaining = count;

        for (band, &latitude) in latitudes.iter().enumerate() {
            if remaining == 0 {
                break;
            }
            let take = capacity(latitude, opts.capacity_multiplier).min(remaining);
            counts[band] = take;
            remaining -= take;
        }

        if remaining > 0 {
            // Top-up pass: same bands, larger assumed capacity.
            for (band, &latitude) in latitudes.iter().enumerate() {
                if remaining == 0 {
                    break;
                }
                let room = capacity(latitude, opts.topup_multiplier).saturating_sub(counts[band]);
                let take = room.min(remaining);
                counts[band] += take;
                remaining -= take;
            }
        }
        if remaining > 0 {
            // The equator band absorbs whatever both passes left over.
            counts[0] += remaining;
        }

        debug!("distribution: {count} images over {bands} bands {counts:?}");

        let mut placements = Vec::with_capacity(count);
        for (band, (&latitude, &slots)) in latitudes.iter().zip(&counts).enumerate() {
            if slots == 0 {
                continue;
            }
            let step = 360.0 / slots as f32;
            for slot in 0..slots {
                let lat = latitude + band_jitter(band, slot, 0) * opts.latitude_jitter;
                let lng = (slot as f32 * step + band_jitter(band, slot, 1) * opts.longitude_jitter)
                    .rem_euclid(360.0)
                    - 180.0;
                placements.push(GeoPosition::new(lat.clamp(-89.0, 89.0), lng));
            }
        }
        placements
    }

    /// Band center latitudes: equator first, then alternating outward
    /// (+Δ, −Δ, +2Δ, −2Δ, …) up to the configured extent.
    fn band_latitudes(&self, count: usize) -> SmallVec<[f32; 8]> {
        let opts = &self.options;
        let bands = ((count as f32).sqrt().ceil() as usize)
            .min(opts.max_bands.min(MAX_BAND_LIMIT))
            .max(1);
        let rings = (bands / 2).max(1) as f32;
        let delta = opts.latitude_extent / rings;

        (0..bands)
            .map(|i| {
                if i == 0 {
                    0.0
                } else {
                    let ring = i.div_ceil(2) as f32;
                    let sign = if i % 2 == 1 { 1.0 } else { -1.0 };
                    sign * ring * delta
                }
            })
            .collect()
    }
}

/// Deterministic jitter in [-1, 1], seeded by band and slot index.
fn band_jitter(band: usize, slot: usize, salt: u64) -> f32 {
    let mut seed = [0u8; 24];
    seed[..8].copy_from_slice(&(band as u64).to_le_bytes());
    seed[8..16].copy_from_slice(&(slot as u64).to_le_bytes());
    seed[16..].copy_from_slice(&salt.to_le_bytes());

    (xxh3_64(&seed) % 20_001) as f32 / 10_000.0 - 1.0
}

use futures::future::join_all;
use glam::{Vec2, Vec3};
use log::{debug, warn};
use slotmap::SlotMap;
use xxhash_rust::xxh3::xxh3_64;

use crate::errors::{GyreError, Result};
use crate::projection::distribution::{DistributionOptions, DistributionPlanner};
use crate::projection::registry::{ProjectionRecord, ProjectionRegistry};
use crate::projection::{GeoPosition, MeshKey};
use crate::resources::geometry::{grid_indices, grid_uvs, Geometry};
use crate::resources::image::ImageSource;

/// Upper bound of the anti-z-fighting offset, in sphere-radius units.
pub const MAX_SURFACE_OFFSET: f32 = 0.01;

/// Denominator floor for the longitude-offset division near the poles.
const MIN_POLAR_SIN: f32 = 1e-4;

/// Per-image projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionParams {
    /// Angular height coverage in radians. Zero collapses the grid to the
    /// anchor point (a valid zero-area mesh); negative is rejected.
    pub target_size: f32,
    pub position: GeoPosition,
    /// Anchor alignment in [-1, 1] per axis: -1 pins one edge to the
    /// anchor, 0 centers, +1 pins the opposite edge.
    pub alignment: Vec2,
    /// Mesh-level rotation in radians, carried through to the render layer.
    pub rotation: Vec3,
}

impl Default for ProjectionParams {
    fn default() -> Self {
        Self {
            target_size: 0.22,
            position: GeoPosition::default(),
            alignment: Vec2::ZERO,
            rotation: Vec3::ZERO,
        }
    }
}

impl ProjectionParams {
    pub fn validate(&self) -> Result<()> {
        if !self.target_size.is_finite() || self.target_size < 0.0 {
            return Err(GyreError::invalid(
                "projection target_size",
                f64::from(self.target_size),
            ));
        }
        for v in [self.position.lat, self.position.lng] {
            if !v.is_finite() {
                return Err(GyreError::invalid("projection position", f64::from(v)));
            }
        }
        for v in [self.alignment.x, self.alignment.y] {
            if !v.is_finite() || !(-1.0..=1.0).contains(&v) {
                return Err(GyreError::invalid("projection alignment", f64::from(v)));
            }
        }
        for v in self.rotation.to_array() {
            if !v.is_finite() {
                return Err(GyreError::invalid("projection rotation", f64::from(v)));
            }
        }
        Ok(())
    }
}

/// Options for batch projection with planned distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchProjectionOptions {
    pub target_size: f32,
    pub alignment: Vec2,
    pub rotation: Vec3,
    pub distribution: DistributionOptions,
}

impl Default for BatchProjectionOptions {
    fn default() -> Self {
        Self {
            target_size: 0.22,
            alignment: Vec2::ZERO,
            rotation: Vec3::ZERO,
            distribution: DistributionOptions::default(),
        }
    }
}

/// A curved mesh produced by projection, read by the render layer.
#[derive(Debug, Clone)]
pub struct ProjectedMesh {
    pub geometry: Geometry,
    pub image_url: String,
    pub rotation: Vec3,
}

/// Deterministic outward surface offset for an image at a position.
///
/// A pure function of the integer-scaled latitude and longitude (×1000)
/// and the byte sum of the image identifier, hashed together: images at
/// nearly the same location get distinct radii, and the same inputs yield
/// the same offset across re-projections and process restarts. Result is
/// in [0, [`MAX_SURFACE_OFFSET`]) sphere-radius units.
#[must_use]
pub fn surface_offset(position: GeoPosition, image_url: &str) -> f32 {
    let quantized_lat = (f64::from(position.lat) * 1000.0).round() as i64;
    let quantized_lng = (f64::from(position.lng) * 1000.0).round() as i64;
    let char_sum: u64 = image_url.bytes().map(u64::from).sum();

    let mut seed = [0u8; 24];
    seed[..8].copy_from_slice(&quantized_lat.to_le_bytes());
    seed[8..16].copy_from_slice(&quantized_lng.to_le_bytes());
    seed[16..].copy_from_slice(&char_sum.to_le_bytes());

    MAX_SURFACE_OFFSET * ((xxh3_64(&seed) % 10_000) as f32 / 10_000.0)
}

/// Maps flat arc-length coordinates onto the sphere surface.
///
/// `local` coordinates are offsets from the projection anchor: y moves
/// along a meridian (`Δphi = y/r`), x along the local parallel
/// (`Δtheta = x/(r·sin(phi+Δphi))`, denominator floored near the poles).
fn project_vertices(
    radius: f32,
    position: GeoPosition,
    offset: f32,
    local: impl Iterator<Item = Vec2>,
) -> Vec<Vec3> {
    let phi = (90.0 - position.lat).to_radians();
    let theta = (position.lng + 180.0).to_radians();
    let radial = radius * (1.0 + offset);

    local
        .map(|p| {
            let phi2 = phi + p.y / radius;
            let sin_phi = phi2.sin();
            let denom = if sin_phi.abs() < MIN_POLAR_SIN {
                MIN_POLAR_SIN * sin_phi.signum()
            } else {
                sin_phi
            };
            let theta2 = theta + p.x / (radius * denom);

            Vec3::new(
                -radial * phi2.sin() * theta2.cos(),
                radial * phi2.cos(),
                radial * phi2.sin() * theta2.sin(),
            )
        })
        .collect()
}

/// Projects flat images onto a sphere and re-curves them in place when the
/// global size multiplier changes.
///
/// Exclusively owns the projected meshes and their registry records; the
/// render layer reads meshes by key and never owns them.
#[derive(Debug)]
pub struct SphericalProjector {
    radius: f32,
    segments: u32,
    multiplier: f32,
    meshes: SlotMap<MeshKey, ProjectedMesh>,
    registry: ProjectionRegistry,
}

impl SphericalProjector {
    /// A zero or non-finite radius is rejected here so the projection math
    /// can assume a valid sphere everywhere else.
    pub fn new(radius: f32, segments: u32) -> Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(GyreError::invalid("sphere radius", f64::from(radius)));
        }
        Ok(Self {
            radius,
            segments: segments.max(1),
            multiplier: 1.0,
            meshes: SlotMap::with_key(),
            registry: ProjectionRegistry::new(),
        })
    }

    #[must_use]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    #[must_use]
    pub fn size_multiplier(&self) -> f32 {
        self.multiplier
    }

    #[must_use]
    pub fn mesh(&self, key: MeshKey) -> Option<&ProjectedMesh> {
        self.meshes.get(key)
    }

    pub fn meshes(&self) -> impl Iterator<Item = (MeshKey, &ProjectedMesh)> {
        self.meshes.iter()
    }

    #[must_use]
    pub fn record(&self, key: MeshKey) -> Option<&ProjectionRecord> {
        self.registry.get(key)
    }

    #[must_use]
    pub fn projection_count(&self) -> usize {
        self.registry.len()
    }

    // ========================================================================
    // Projection
    // ========================================================================

    /// Loads one image and projects it at the given parameters.
    pub async fn project_image<S: ImageSource>(
        &mut self,
        source: &S,
        url: &str,
        params: &ProjectionParams,
    ) -> Result<MeshKey> {
        params.validate()?;
        let image = source.load(url).await?;
        self.insert_projection(url, image.aspect(), params)
    }

    /// Plans an even spherical distribution for `urls`, loads all images
    /// concurrently, and projects each successful load.
    ///
    /// A failed load rejects only its own slot; sibling projections are
    /// unaffected. The outer error covers invalid options only.
    pub async fn project_images_spherically<S: ImageSource>(
        &mut self,
        source: &S,
        urls: &[String],
        options: &BatchProjectionOptions,
    ) -> Result<Vec<Result<MeshKey>>> {
        let planner = DistributionPlanner::new(options.distribution.clone())?;
        let placements = planner.plan(urls.len());
        let loaded = join_all(urls.iter().map(|url| source.load(url))).await;

        let mut handles = Vec::with_capacity(urls.len());
        for ((url, image), position) in urls.iter().zip(loaded).zip(placements) {
            let result = image.and_then(|image| {
                let params = ProjectionParams {
                    target_size: options.target_size,
                    position,
                    alignment: options.alignment,
                    rotation: options.rotation,
                };
                self.insert_projection(url, image.aspect(), &params)
            });
            if let Err(err) = &result {
                warn!("projection failed for {url:?}: {err}");
            }
            handles.push(result);
        }
        Ok(handles)
    }

    fn insert_projection(
        &mut self,
        url: &str,
        aspect: f32,
        params: &ProjectionParams,
    ) -> Result<MeshKey> {
        params.validate()?;

        let local = self.flat_local_grid(params.target_size, aspect, params.alignment);
        let offset = surface_offset(params.position, url);
        let positions =
            project_vertices(self.radius, params.position, offset, local.iter().copied());
        let geometry = Geometry::new(positions, grid_uvs(self.segments), grid_indices(self.segments));

        let key = self.meshes.insert(ProjectedMesh {
            geometry,
            image_url: url.to_string(),
            rotation: params.rotation,
        });
        self.registry.insert(
            key,
            ProjectionRecord {
                image_url: url.to_string(),
                original_target_size: params.target_size,
                position: params.position,
                alignment: params.alignment,
                rotation: params.rotation,
                aspect_ratio: aspect,
                local_coords: local,
                created_multiplier: self.multiplier,
            },
        );
        debug!(
            "projected {url:?} at ({:.1}, {:.1})",
            params.position.lat, params.position.lng
        );
        Ok(key)
    }

    /// Flat, alignment-shifted arc-length grid for the current multiplier.
    ///
    /// The alignment shift is folded into the stored coordinates: it
    /// scales linearly with the rectangle extents, so ratio-scaling the
    /// shifted coordinates during a morph reproduces it exactly.
    fn flat_local_grid(&self, target_size: f32, aspect: f32, alignment: Vec2) -> Vec<Vec2> {
        let width_arc = target_size * aspect * self.multiplier * self.radius;
        let height_arc = target_size * self.multiplier * self.radius;
        let segments = self.segments;

        let side = segments + 1;
        let mut local = Vec::with_capacity((side * side) as usize);
        for iy in 0..side {
            let v = iy as f32 / segments as f32;
            for ix in 0..side {
                let u = ix as f32 / segments as f32;
                local.push(Vec2::new(
                    (u - 0.5 + alignment.x * 0.5) * width_arc,
                    (0.5 - v + alignment.y * 0.5) * height_arc,
                ));
            }
        }
        local
    }

    // ========================================================================
    // Morphing
    // ========================================================================

    /// Sets the global size multiplier, morphing every tracked projection
    /// in place.
    ///
    /// An unchanged value returns without touching any geometry; the morph
    /// pass is not free and must not run on redundant writes.
    pub fn set_size_multiplier(&mut self, value: f32) -> Result<()> {
        if !value.is_finite() || value <= 0.0 {
            return Err(GyreError::invalid("size multiplier", f64::from(value)));
        }
        if value == self.multiplier {
            return Ok(());
        }
        self.multiplier = value;
        self.morph_all();
        Ok(())
    }

    /// Rewrites every projection's vertex buffer from its original flat
    /// basis — never from the previous frame's result, so multiplier
    /// round-trips land back on the exact original positions.
    fn morph_all(&mut self) {
        debug!(
            "morph pass: {} projections at multiplier {:.3}",
            self.registry.len(),
            self.multiplier
        );
        let radius = self.radius;
        let multiplier = self.multiplier;
        let Self {
            registry, meshes, ..
        } = self;

        for (key, record) in registry.iter() {
            let Some(mesh) = meshes.get_mut(key) else {
                continue;
            };
            let ratio = multiplier / record.created_multiplier;
            let offset = surface_offset(record.position, &record.image_url);
            let positions = project_vertices(
                radius,
                record.position,
                offset,
                record.local_coords.iter().map(|c| *c * ratio),
            );
            mesh.geometry.set_positions(&positions);
            mesh.geometry.compute_vertex_normals();
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Releases one projection: its mesh and its registry record.
    pub fn release(&mut self, key: MeshKey) -> bool {
        self.registry.remove(key);
        self.meshes.remove(key).is_some()
    }

    /// Releases every mesh and registry record.
    pub fn dispose(&mut self) {
        debug!("disposing projector: {} projections", self.registry.len());
        self.meshes.clear();
        self.registry.clear();
    }
}

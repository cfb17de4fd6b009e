use glam::{Vec2, Vec3};
use slotmap::SecondaryMap;

use crate::projection::{GeoPosition, MeshKey};

/// The persistent metadata needed to re-derive a projected image's
/// geometry at any size multiplier.
///
/// `local_coords` are the flat, alignment-shifted arc-length coordinates
/// of every grid vertex at creation time; the morph pass scales them by
/// the ratio of the new multiplier to `created_multiplier` and re-projects,
/// so repeated multiplier changes always derive from the same original
/// basis and compose idempotently.
#[derive(Debug, Clone)]
pub struct ProjectionRecord {
    pub image_url: String,
    /// Angular height coverage in radians, before any multiplier.
    pub original_target_size: f32,
    pub position: GeoPosition,
    pub alignment: Vec2,
    pub rotation: Vec3,
    pub aspect_ratio: f32,
    pub(crate) local_coords: Vec<Vec2>,
    pub(crate) created_multiplier: f32,
}

/// Owner of every [`ProjectionRecord`], keyed by the projector's mesh
/// handles.
///
/// Records are inserted on successful projection, removed with their mesh,
/// and cleared wholesale on projector disposal. The morph pass reads many
/// records and writes each mesh once per multiplier change; the
/// single-threaded cooperative model serializes those passes.
#[derive(Debug, Default)]
pub struct ProjectionRegistry {
    records: SecondaryMap<MeshKey, ProjectionRecord>,
}

impl ProjectionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: MeshKey, record: ProjectionRecord) {
        self.records.insert(key, record);
    }

    #[must_use]
    pub fn get(&self, key: MeshKey) -> Option<&ProjectionRecord> {
        self.records.get(key)
    }

    pub fn remove(&mut self, key: MeshKey) -> Option<ProjectionRecord> {
        self.records.remove(key)
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (MeshKey, &ProjectionRecord)> {
        self.records.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

use glam::{Vec2, Vec3};

/// CPU-side triangle mesh data.
///
/// Positions are the only attribute rewritten after creation (the morph
/// pass); `data_version` is bumped on every rewrite so a renderer can
/// re-upload only dirty buffers. UVs and indices are fixed at creation —
/// morphing moves vertices, it never re-topologizes.
#[derive(Debug, Clone)]
pub struct Geometry {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    uvs: Vec<Vec2>,
    indices: Vec<u32>,
    data_version: u64,
}

impl Geometry {
    #[must_use]
    pub fn new(positions: Vec<Vec3>, uvs: Vec<Vec2>, indices: Vec<u32>) -> Self {
        let normals = vec![Vec3::ZERO; positions.len()];
        let mut geo = Self {
            positions,
            normals,
            uvs,
            indices,
            data_version: 1,
        };
        geo.compute_vertex_normals();
        geo
    }

    #[must_use]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    #[must_use]
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    #[must_use]
    pub fn uvs(&self) -> &[Vec2] {
        &self.uvs
    }

    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Version counter for change detection; bumped on every in-place
    /// rewrite of vertex data.
    #[must_use]
    pub fn data_version(&self) -> u64 {
        self.data_version
    }

    /// Rewrites vertex positions in place, keeping topology and UVs.
    ///
    /// The new slice must match the existing vertex count; mismatched
    /// lengths are ignored (topology is immutable after creation).
    pub fn set_positions(&mut self, positions: &[Vec3]) {
        if positions.len() != self.positions.len() {
            return;
        }
        self.positions.copy_from_slice(positions);
        self.data_version = self.data_version.wrapping_add(1);
    }

    /// Recomputes area-weighted vertex normals from the index buffer.
    ///
    /// The cross product's magnitude is twice the triangle area, so
    /// accumulating unnormalized face normals weights each face by area;
    /// a single normalization pass at the end finishes the job.
    pub fn compute_vertex_normals(&mut self) {
        let count = self.positions.len();
        let mut normals = vec![Vec3::ZERO; count];

        for tri in self.indices.chunks_exact(3) {
            let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            if i0 >= count || i1 >= count || i2 >= count {
                continue;
            }

            let v0 = self.positions[i0];
            let v1 = self.positions[i1];
            let v2 = self.positions[i2];

            let face_normal = (v1 - v0).cross(v2 - v0);

            normals[i0] += face_normal;
            normals[i1] += face_normal;
            normals[i2] += face_normal;
        }

        for n in &mut normals {
            *n = n.normalize_or_zero();
        }

        self.normals = normals;
        self.data_version = self.data_version.wrapping_add(1);
    }
}

/// UVs for a `(segments+1)²` rectangular grid, row-major, v flipped so the
/// image top maps to the grid top.
#[must_use]
pub fn grid_uvs(segments: u32) -> Vec<Vec2> {
    let side = segments + 1;
    let mut uvs = Vec::with_capacity((side * side) as usize);
    for iy in 0..side {
        for ix in 0..side {
            uvs.push(Vec2::new(
                ix as f32 / segments as f32,
                1.0 - iy as f32 / segments as f32,
            ));
        }
    }
    uvs
}

/// Two triangles per grid cell, counter-clockwise winding.
#[must_use]
pub fn grid_indices(segments: u32) -> Vec<u32> {
    let side = segments + 1;
    let mut indices = Vec::with_capacity((segments * segments * 6) as usize);
    for iy in 0..segments {
        for ix in 0..segments {
            let a = ix + side * iy;
            let b = ix + side * (iy + 1);
            let c = (ix + 1) + side * (iy + 1);
            let d = (ix + 1) + side * iy;

            indices.push(a);
            indices.push(b);
            indices.push(d);

            indices.push(b);
            indices.push(c);
            indices.push(d);
        }
    }
    indices
}

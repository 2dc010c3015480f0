//! LOD terrain mesh construction from a bordered height grid.

use glam::{Vec2, Vec3};
use veld_noise::Grid2;

use crate::settings::{MeshSettings, NUM_SUPPORTED_LODS, simplification_increment};

/// Identifies a sampled grid vertex as drawable or border-only.
///
/// Border vertices exist so triangles along the chunk edge have the
/// out-of-chunk neighbor they need for correct normal accumulation; they are
/// never referenced by the drawable triangle buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertexId {
    /// Index into the drawable vertex buffer.
    Interior(u32),
    /// Index into the border-only vertex buffer.
    Border(u32),
}

impl VertexId {
    fn is_border(self) -> bool {
        matches!(self, VertexId::Border(_))
    }
}

/// Vertex, index, uv, and normal buffers for one (chunk, LOD) pair.
///
/// Built once and never mutated. `normals` is `Some` on the smooth-shaded
/// path; the flat-shaded path duplicates vertices per triangle instead and
/// leaves per-face normal derivation to the renderer.
#[derive(Clone, Debug)]
pub struct MeshData {
    /// Drawable vertex positions.
    pub vertices: Vec<Vec3>,
    /// Triangle indices, three per triangle.
    pub triangles: Vec<u32>,
    /// Texture coordinates, one per vertex.
    pub uvs: Vec<Vec2>,
    /// Baked seam-corrected normals (smooth path only).
    pub normals: Option<Vec<Vec3>>,
}

impl MeshData {
    /// Number of drawable triangles.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    /// Whether this mesh was built on the flat-shaded path.
    pub fn is_flat_shaded(&self) -> bool {
        self.normals.is_none()
    }
}

struct MeshBuffers {
    vertices: Vec<Vec3>,
    uvs: Vec<Vec2>,
    triangles: Vec<u32>,
    border_vertices: Vec<Vec3>,
    border_triangles: Vec<[VertexId; 3]>,
}

impl MeshBuffers {
    fn new(interior_count: usize, border_count: usize) -> Self {
        Self {
            vertices: vec![Vec3::ZERO; interior_count],
            uvs: vec![Vec2::ZERO; interior_count],
            triangles: Vec::new(),
            border_vertices: vec![Vec3::ZERO; border_count],
            border_triangles: Vec::new(),
        }
    }

    fn add_vertex(&mut self, id: VertexId, position: Vec3, uv: Vec2) {
        match id {
            VertexId::Interior(i) => {
                self.vertices[i as usize] = position;
                self.uvs[i as usize] = uv;
            }
            VertexId::Border(i) => {
                self.border_vertices[i as usize] = position;
            }
        }
    }

    fn add_triangle(&mut self, a: VertexId, b: VertexId, c: VertexId) {
        if a.is_border() || b.is_border() || c.is_border() {
            self.border_triangles.push([a, b, c]);
        } else {
            for id in [a, b, c] {
                if let VertexId::Interior(i) = id {
                    self.triangles.push(i);
                }
            }
        }
    }

    fn position(&self, id: VertexId) -> Vec3 {
        match id {
            VertexId::Interior(i) => self.vertices[i as usize],
            VertexId::Border(i) => self.border_vertices[i as usize],
        }
    }

    fn face_normal(&self, a: VertexId, b: VertexId, c: VertexId) -> Vec3 {
        let pa = self.position(a);
        let ab = self.position(b) - pa;
        let ac = self.position(c) - pa;
        ab.cross(ac).normalize_or_zero()
    }

    /// Per-vertex normals from accumulated face normals. Border triangles
    /// contribute to their interior corners and are then discarded, which is
    /// what keeps lighting continuous across chunk boundaries.
    fn bake_normals(&self) -> Vec<Vec3> {
        let mut normals = vec![Vec3::ZERO; self.vertices.len()];

        for tri in self.triangles.chunks_exact(3) {
            let (a, b, c) = (
                VertexId::Interior(tri[0]),
                VertexId::Interior(tri[1]),
                VertexId::Interior(tri[2]),
            );
            let face = self.face_normal(a, b, c);
            for &i in tri {
                normals[i as usize] += face;
            }
        }

        for &[a, b, c] in &self.border_triangles {
            let face = self.face_normal(a, b, c);
            for id in [a, b, c] {
                if let VertexId::Interior(i) = id {
                    normals[i as usize] += face;
                }
            }
        }

        for n in &mut normals {
            *n = n.normalize_or_zero();
        }
        normals
    }

    fn into_smooth_mesh(self) -> MeshData {
        let normals = self.bake_normals();
        MeshData {
            vertices: self.vertices,
            triangles: self.triangles,
            uvs: self.uvs,
            normals: Some(normals),
        }
    }

    /// Re-expand the buffers so every triangle owns three unique vertices.
    /// The renderer derives per-face normals from the duplicated geometry.
    fn into_flat_shaded_mesh(self) -> MeshData {
        let mut vertices = Vec::with_capacity(self.triangles.len());
        let mut uvs = Vec::with_capacity(self.triangles.len());
        let mut triangles = Vec::with_capacity(self.triangles.len());

        for (new_index, &old_index) in self.triangles.iter().enumerate() {
            vertices.push(self.vertices[old_index as usize]);
            uvs.push(self.uvs[old_index as usize]);
            triangles.push(new_index as u32);
        }

        MeshData {
            vertices,
            triangles,
            uvs,
            normals: None,
        }
    }
}

/// Build the drawable mesh for one chunk at one LOD level.
///
/// Pure function over an immutable bordered height grid, safe to run on any
/// worker thread. The grid side must be `1 + k * increment` for the LOD's
/// simplification increment; a mismatch is a configuration error and panics.
pub fn build_terrain_mesh(height_grid: &Grid2, settings: &MeshSettings, lod: u32) -> MeshData {
    assert!(
        lod < NUM_SUPPORTED_LODS,
        "LOD {lod} outside supported range 0..{NUM_SUPPORTED_LODS}"
    );
    let increment = simplification_increment(lod);
    let bordered_size = height_grid.width();
    assert_eq!(
        height_grid.height(),
        bordered_size,
        "height grid must be square"
    );
    assert_eq!(
        (bordered_size - 1) % increment,
        0,
        "LOD {lod} increment {increment} does not divide the grid span {}",
        bordered_size - 1
    );

    let mesh_size = bordered_size - 2 * increment;
    let mesh_size_unsimplified = bordered_size - 2;
    let drawable_span = mesh_size_unsimplified as f32 - 1.0;
    let top_left_x = drawable_span / -2.0;
    let top_left_z = drawable_span / 2.0;

    // Sampled grid positions per axis: 0, increment, ..., bordered_size - 1.
    let sampled_per_line = (bordered_size - 1) / increment + 1;

    let mut index_map = vec![VertexId::Interior(0); sampled_per_line * sampled_per_line];
    let mut interior_count = 0u32;
    let mut border_count = 0u32;
    for sy in 0..sampled_per_line {
        for sx in 0..sampled_per_line {
            let x = sx * increment;
            let y = sy * increment;
            let is_border = x == 0 || y == 0 || x == bordered_size - 1 || y == bordered_size - 1;
            index_map[sy * sampled_per_line + sx] = if is_border {
                let id = VertexId::Border(border_count);
                border_count += 1;
                id
            } else {
                let id = VertexId::Interior(interior_count);
                interior_count += 1;
                id
            };
        }
    }

    let mut buffers = MeshBuffers::new(interior_count as usize, border_count as usize);

    for sy in 0..sampled_per_line {
        for sx in 0..sampled_per_line {
            let x = sx * increment;
            let y = sy * increment;
            let id = index_map[sy * sampled_per_line + sx];

            // Parametrize over the strided interior span so the first and
            // last drawable vertices of every LOD land on the exact same
            // chunk corners.
            let percent = Vec2::new(
                (x as f32 - increment as f32) / (mesh_size as f32 - 1.0),
                (y as f32 - increment as f32) / (mesh_size as f32 - 1.0),
            );
            let height = height_grid.get(x, y);
            let position = Vec3::new(
                (top_left_x + percent.x * drawable_span) * settings.mesh_scale,
                height,
                (top_left_z - percent.y * drawable_span) * settings.mesh_scale,
            );
            buffers.add_vertex(id, position, percent);

            if sx < sampled_per_line - 1 && sy < sampled_per_line - 1 {
                let a = index_map[sy * sampled_per_line + sx];
                let b = index_map[sy * sampled_per_line + sx + 1];
                let c = index_map[(sy + 1) * sampled_per_line + sx];
                let d = index_map[(sy + 1) * sampled_per_line + sx + 1];
                buffers.add_triangle(a, d, c);
                buffers.add_triangle(d, a, b);
            }
        }
    }

    if settings.use_flat_shading {
        buffers.into_flat_shaded_mesh()
    } else {
        buffers.into_smooth_mesh()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veld_heightfield::{HeightMapSettings, generate_height_map};
    use veld_noise::NoiseSettings;

    fn flat_grid(side: usize, height: f32) -> Grid2 {
        let mut grid = Grid2::new(side, side);
        grid.map_in_place(|_| height);
        grid
    }

    fn noisy_grid(side: usize) -> Grid2 {
        let mut grid = Grid2::new(side, side);
        for y in 0..side {
            for x in 0..side {
                let v = ((x * 31 + y * 17) % 13) as f32 * 0.37;
                grid.set(x, y, v);
            }
        }
        grid
    }

    fn smooth_settings() -> MeshSettings {
        MeshSettings {
            mesh_scale: 1.0,
            use_flat_shading: false,
            chunk_size_index: 0,
        }
    }

    /// Expected drawable vertices per line for a bordered side and LOD.
    fn expected_verts_per_line(bordered: usize, lod: u32) -> usize {
        (bordered - 1) / simplification_increment(lod) - 1
    }

    #[test]
    fn test_smooth_shape_law_across_lods() {
        let bordered = 49; // 48-cell chunk
        let grid = noisy_grid(bordered);
        for lod in 0..NUM_SUPPORTED_LODS {
            let mesh = build_terrain_mesh(&grid, &smooth_settings(), lod);
            let vpl = expected_verts_per_line(bordered, lod);
            assert_eq!(
                mesh.vertices.len(),
                vpl * vpl,
                "vertex count at LOD {lod}"
            );
            assert_eq!(
                mesh.triangles.len(),
                (vpl - 1) * (vpl - 1) * 6,
                "triangle index count at LOD {lod}"
            );
            assert_eq!(mesh.uvs.len(), mesh.vertices.len());
            assert_eq!(
                mesh.normals.as_ref().map(Vec::len),
                Some(mesh.vertices.len())
            );
        }
    }

    #[test]
    fn test_no_drawable_triangle_references_border() {
        let grid = noisy_grid(49);
        for lod in [0, 2, 4] {
            let mesh = build_terrain_mesh(&grid, &smooth_settings(), lod);
            let vertex_count = mesh.vertices.len() as u32;
            assert!(
                mesh.triangles.iter().all(|&i| i < vertex_count),
                "drawable indices must stay inside the drawable vertex buffer"
            );
        }
    }

    #[test]
    fn test_flat_shading_expands_buffers() {
        let grid = noisy_grid(49);
        let smooth = build_terrain_mesh(&grid, &smooth_settings(), 1);
        let flat = build_terrain_mesh(
            &grid,
            &MeshSettings {
                use_flat_shading: true,
                ..smooth_settings()
            },
            1,
        );

        assert_eq!(flat.vertices.len(), smooth.triangles.len());
        assert_eq!(flat.uvs.len(), flat.vertices.len());
        assert!(flat.normals.is_none(), "flat path bakes no normals");
        let expected: Vec<u32> = (0..flat.vertices.len() as u32).collect();
        assert_eq!(flat.triangles, expected, "flat indices are 0..3n");
        assert_eq!(flat.triangle_count(), smooth.triangle_count());
    }

    #[test]
    fn test_flat_grid_normals_point_up() {
        let grid = flat_grid(49, 5.0);
        let mesh = build_terrain_mesh(&grid, &smooth_settings(), 0);
        for (i, n) in mesh.normals.as_ref().unwrap().iter().enumerate() {
            assert!(
                (*n - Vec3::Y).length() < 1e-5,
                "normal {i} of a flat grid should be +Y, got {n:?}"
            );
        }
    }

    #[test]
    fn test_lods_share_chunk_corners() {
        let bordered = 49;
        let grid = flat_grid(bordered, 0.0);
        let settings = smooth_settings();
        let corner_extent = (bordered as f32 - 3.0) / 2.0;

        for lod in 0..NUM_SUPPORTED_LODS {
            let mesh = build_terrain_mesh(&grid, &settings, lod);
            let min_x = mesh.vertices.iter().map(|v| v.x).fold(f32::MAX, f32::min);
            let max_x = mesh.vertices.iter().map(|v| v.x).fold(f32::MIN, f32::max);
            assert!(
                (min_x + corner_extent).abs() < 1e-4 && (max_x - corner_extent).abs() < 1e-4,
                "LOD {lod} drawable extent [{min_x}, {max_x}] should match ±{corner_extent}"
            );
        }
    }

    #[test]
    fn test_uvs_identical_across_lods_at_shared_corners() {
        let grid = noisy_grid(49);
        let settings = smooth_settings();
        for lod in 0..NUM_SUPPORTED_LODS {
            let mesh = build_terrain_mesh(&grid, &settings, lod);
            let min_uv = mesh.uvs.iter().map(|uv| uv.x).fold(f32::MAX, f32::min);
            let max_uv = mesh.uvs.iter().map(|uv| uv.x).fold(f32::MIN, f32::max);
            assert!(min_uv.abs() < 1e-6, "uv origin at LOD {lod}");
            assert!((max_uv - 1.0).abs() < 1e-6, "uv end at LOD {lod}");
        }
    }

    #[test]
    #[should_panic(expected = "does not divide")]
    fn test_incompatible_grid_side_panics() {
        // Side 50 gives span 49, which LOD 1's increment of 2 cannot stride.
        let grid = flat_grid(50, 0.0);
        build_terrain_mesh(&grid, &smooth_settings(), 1);
    }

    /// Two adjacent chunks sampled from the same global noise field must get
    /// matching normals along their shared edge; the border ring exists for
    /// exactly this.
    #[test]
    fn test_normals_agree_across_adjacent_chunks() {
        let mesh_settings = MeshSettings {
            mesh_scale: 2.0,
            use_flat_shading: false,
            chunk_size_index: 0,
        };
        let height_settings = HeightMapSettings {
            noise: NoiseSettings {
                seed: 99,
                scale: 40.0,
                ..NoiseSettings::default()
            },
            ..HeightMapSettings::default()
        }
        .validated();

        let side = mesh_settings.num_verts_per_line();
        // Neighbor chunks along +x: sample centers differ by the chunk span
        // in noise units.
        let span = side as f32 - 3.0;
        let left = generate_height_map(side, side, &height_settings, Vec2::ZERO);
        let right = generate_height_map(side, side, &height_settings, Vec2::new(span, 0.0));

        let mesh_left = build_terrain_mesh(&left.values, &mesh_settings, 0);
        let mesh_right = build_terrain_mesh(&right.values, &mesh_settings, 0);

        let normals_left = mesh_left.normals.as_ref().unwrap();
        let normals_right = mesh_right.normals.as_ref().unwrap();

        // Interior verts form a (side - 2)^2 grid in row-major order; the
        // right edge column of the left chunk coincides with the left edge
        // column of the right chunk.
        let vpl = side - 2;
        for row in 0..vpl {
            let left_edge = normals_left[row * vpl + (vpl - 1)];
            let right_edge = normals_right[row * vpl];
            assert!(
                (left_edge - right_edge).length() < 1e-3,
                "normal seam at row {row}: {left_edge:?} vs {right_edge:?}"
            );
        }
    }
}

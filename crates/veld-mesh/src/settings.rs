//! Mesh configuration: chunk sizes, world scale, LOD support.

use serde::{Deserialize, Serialize};

/// Number of supported LOD levels (indices `0..NUM_SUPPORTED_LODS`).
pub const NUM_SUPPORTED_LODS: u32 = 5;

/// Supported chunk spans, in grid cells per side. Every entry is a multiple
/// of 24, so the simplification increment of every supported LOD divides it.
pub const SUPPORTED_CHUNK_SIZES: [usize; 9] = [48, 72, 96, 120, 144, 168, 192, 216, 240];

/// Number of entries in [`SUPPORTED_CHUNK_SIZES`].
pub const NUM_SUPPORTED_CHUNK_SIZES: usize = SUPPORTED_CHUNK_SIZES.len();

/// Flat shading sextuples the vertex buffer, so only the first few chunk
/// sizes keep buffers at a renderer-friendly size.
pub const NUM_SUPPORTED_FLAT_SHADED_CHUNK_SIZES: usize = 3;

/// Vertex-skip stride for a LOD level: 1 at full detail, `2 * lod` beyond.
pub fn simplification_increment(lod: u32) -> usize {
    if lod == 0 { 1 } else { 2 * lod as usize }
}

/// Mesh construction settings shared by every chunk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshSettings {
    /// Uniform world scale applied to the mesh footprint.
    pub mesh_scale: f32,
    /// Duplicate vertices per triangle for hard-edged shading.
    pub use_flat_shading: bool,
    /// Index into [`SUPPORTED_CHUNK_SIZES`].
    pub chunk_size_index: usize,
}

impl Default for MeshSettings {
    fn default() -> Self {
        Self {
            mesh_scale: 2.5,
            use_flat_shading: false,
            chunk_size_index: 8,
        }
    }
}

impl MeshSettings {
    /// Return a copy with the size index clamped into the supported range
    /// (the flat-shaded range when flat shading is on).
    pub fn validated(mut self) -> Self {
        let limit = if self.use_flat_shading {
            NUM_SUPPORTED_FLAT_SHADED_CHUNK_SIZES
        } else {
            NUM_SUPPORTED_CHUNK_SIZES
        };
        self.chunk_size_index = self.chunk_size_index.min(limit - 1);
        self
    }

    /// Vertices per line of the bordered height grid, including the two
    /// border verts per line that never reach the drawable mesh.
    pub fn num_verts_per_line(&self) -> usize {
        SUPPORTED_CHUNK_SIZES[self.chunk_size_index] + 1
    }

    /// World-space side length of one chunk.
    pub fn mesh_world_size(&self) -> f32 {
        (self.num_verts_per_line() as f32 - 3.0) * self.mesh_scale
    }
}

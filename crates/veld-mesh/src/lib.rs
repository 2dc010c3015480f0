//! Seam-free level-of-detail terrain meshing from bordered height grids.
//!
//! The builder is a pure function over an immutable height grid, so it can
//! run on any worker thread. The grid carries one extra ring of samples per
//! side; triangles touching that ring contribute to interior vertex normals
//! but are never emitted in the drawable buffers, which removes the lighting
//! seam that would otherwise appear along chunk boundaries.

mod settings;
mod terrain_mesh;

pub use settings::{
    MeshSettings, NUM_SUPPORTED_CHUNK_SIZES, NUM_SUPPORTED_FLAT_SHADED_CHUNK_SIZES,
    NUM_SUPPORTED_LODS, SUPPORTED_CHUNK_SIZES, simplification_increment,
};
pub use terrain_mesh::{MeshData, VertexId, build_terrain_mesh};

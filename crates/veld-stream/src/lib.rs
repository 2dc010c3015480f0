//! Chunk streaming: visibility, LOD selection, collider lifecycle, eviction.
//!
//! [`TerrainStreamer`] owns the chunk registry and drives the whole pipeline
//! from a single coordinating thread. Height maps and meshes are produced on
//! a [`veld_compute::ComputeQueue`]; results are applied during
//! [`TerrainStreamer::update`] after a revision check, so late results for
//! chunks that were evicted in the meantime are dropped instead of
//! resurrecting state. Engine-side effects (mesh upload, collider swap,
//! visibility toggles) go through the [`TerrainHost`] trait.

mod chunk;
mod coord;
mod host;
mod lod;
mod streamer;

pub use chunk::ChunkWorkResult;
pub use coord::{Bounds2, ChunkCoord};
pub use host::TerrainHost;
pub use lod::{LodBand, select_lod_index};
pub use streamer::{COLLIDER_GENERATION_DISTANCE, TerrainStreamer, VIEWER_MOVE_THRESHOLD};

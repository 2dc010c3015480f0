//! The engine-facing side of the streamer.

use veld_heightfield::HeightMap;
use veld_mesh::MeshData;

use crate::coord::ChunkCoord;

/// Receives the streamer's world-side effects.
///
/// Implemented by whatever owns the renderable scene: a real renderer, a
/// physics backend, or a recording stub in tests. All calls arrive on the
/// coordinating thread during [`crate::TerrainStreamer::update`].
pub trait TerrainHost {
    /// A chunk switched to a new LOD mesh. Replaces any previous mesh.
    fn attach_mesh(&mut self, coord: ChunkCoord, mesh: &MeshData);

    /// Install the chunk's collision mesh. Called at most once per chunk.
    fn set_collider(&mut self, coord: ChunkCoord, mesh: &MeshData);

    /// A chunk entered or left the visible set.
    fn set_visible(&mut self, coord: ChunkCoord, visible: bool);

    /// A chunk's height map finished generating. The observed min/max are
    /// available for height-based texturing. Default: ignored.
    fn height_map_ready(&mut self, _coord: ChunkCoord, _height_map: &HeightMap) {}
}

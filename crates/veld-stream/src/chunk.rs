//! Per-chunk streaming state and background work results.

use std::sync::Arc;

use glam::Vec2;
use veld_heightfield::HeightMap;
use veld_mesh::MeshData;

use crate::coord::{Bounds2, ChunkCoord};

/// A finished background job, drained on the coordinating thread.
///
/// Results carry the chunk revision they were produced for; the streamer
/// drops any result whose revision no longer matches the resident chunk.
pub enum ChunkWorkResult {
    HeightMap {
        coord: ChunkCoord,
        rev: u64,
        height_map: HeightMap,
    },
    Mesh {
        coord: ChunkCoord,
        rev: u64,
        lod_index: usize,
        mesh: MeshData,
    },
}

/// Cache slot for one LOD level of one chunk.
#[derive(Default)]
pub(crate) struct LodMeshSlot {
    pub mesh: Option<Arc<MeshData>>,
    /// One-shot request latch; meshes are requested at most once per chunk
    /// incarnation and LOD.
    pub requested: bool,
}

pub(crate) struct TerrainChunk {
    pub coord: ChunkCoord,
    pub sample_center: Vec2,
    pub bounds: Bounds2,
    pub height_map: Option<Arc<HeightMap>>,
    pub lod_meshes: Vec<LodMeshSlot>,
    /// LOD currently attached host-side, `None` until the first mesh lands.
    pub prev_lod_index: Option<usize>,
    pub visible: bool,
    /// Colliders are swapped in exactly once and never replaced.
    pub has_set_collider: bool,
    /// Incarnation stamp for stale-result rejection.
    pub rev: u64,
}

impl TerrainChunk {
    pub fn new(coord: ChunkCoord, world_size: f32, mesh_scale: f32, band_count: usize, rev: u64) -> Self {
        let position = Vec2::new(coord.x as f32, coord.y as f32) * world_size;
        let mut lod_meshes = Vec::with_capacity(band_count);
        lod_meshes.resize_with(band_count, LodMeshSlot::default);
        Self {
            coord,
            // Noise is sampled in grid units, so the world offset is undone.
            sample_center: position / mesh_scale,
            bounds: Bounds2::new(position, Vec2::splat(world_size)),
            height_map: None,
            lod_meshes,
            prev_lod_index: None,
            visible: false,
            has_set_collider: false,
            rev,
        }
    }
}

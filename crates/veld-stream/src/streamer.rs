//! The chunk streaming state machine.

use glam::Vec2;
use hashbrown::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, trace};

use veld_compute::ComputeQueue;
use veld_heightfield::{HeightMapSettings, generate_height_map};
use veld_mesh::{MeshSettings, build_terrain_mesh};

use crate::chunk::{ChunkWorkResult, TerrainChunk};
use crate::coord::ChunkCoord;
use crate::host::TerrainHost;
use crate::lod::{LodBand, select_lod_index, validate_bands};

/// Colliders are only swapped in once the viewer is this close to the chunk
/// edge, in world units.
pub const COLLIDER_GENERATION_DISTANCE: f32 = 5.0;

/// Viewer displacement that triggers a full candidate-window rescan.
pub const VIEWER_MOVE_THRESHOLD: f32 = 25.0;

const SQR_VIEWER_MOVE_THRESHOLD: f32 = VIEWER_MOVE_THRESHOLD * VIEWER_MOVE_THRESHOLD;

/// Streams terrain chunks around a moving viewer.
///
/// Owns the chunk registry, the visible set, and the compute queue. Call
/// [`TerrainStreamer::update`] once per frame from the thread that owns the
/// host; everything else happens internally.
pub struct TerrainStreamer {
    height_map_settings: HeightMapSettings,
    mesh_settings: MeshSettings,
    detail_levels: Vec<LodBand>,
    collider_lod_index: usize,
    queue: ComputeQueue<ChunkWorkResult>,

    chunks: HashMap<ChunkCoord, TerrainChunk>,
    visible_chunks: Vec<ChunkCoord>,
    viewer_position: Vec2,
    last_scan_position: Option<Vec2>,

    max_view_distance: f32,
    /// Candidate window half-width, in chunks.
    chunks_in_view: i32,
    /// Chunks farther than `chunks_in_view + eviction_margin` (Chebyshev)
    /// from the viewer's chunk are dropped on each rescan.
    eviction_margin: i32,
    next_rev: u64,
}

impl TerrainStreamer {
    /// Create a streamer. Panics on an invalid LOD band list or a collider
    /// index outside it; these are configuration errors, not runtime ones.
    pub fn new(
        height_map_settings: HeightMapSettings,
        mesh_settings: MeshSettings,
        detail_levels: Vec<LodBand>,
        collider_lod_index: usize,
        queue: ComputeQueue<ChunkWorkResult>,
    ) -> Self {
        validate_bands(&detail_levels);
        assert!(
            collider_lod_index < detail_levels.len(),
            "collider LOD index {collider_lod_index} outside the {} detail levels",
            detail_levels.len()
        );
        let height_map_settings = height_map_settings.validated();
        let mesh_settings = mesh_settings.validated();

        let max_view_distance = detail_levels[detail_levels.len() - 1].visible_dst_threshold;
        let chunks_in_view = (max_view_distance / mesh_settings.mesh_world_size()).round() as i32;
        debug!(
            max_view_distance,
            chunks_in_view, collider_lod_index, "terrain streamer created"
        );

        Self {
            height_map_settings,
            mesh_settings,
            detail_levels,
            collider_lod_index,
            queue,
            chunks: HashMap::new(),
            visible_chunks: Vec::new(),
            viewer_position: Vec2::ZERO,
            last_scan_position: None,
            max_view_distance,
            chunks_in_view,
            eviction_margin: 2,
            next_rev: 0,
        }
    }

    /// Override the eviction margin (in chunks beyond the candidate window).
    pub fn with_eviction_margin(mut self, margin: i32) -> Self {
        self.eviction_margin = margin.max(0);
        self
    }

    /// Advance the streamer one frame.
    ///
    /// Applies finished background work, refreshes colliders while the
    /// viewer is away from its last scan point, and rescans the candidate
    /// window once the viewer has moved far enough.
    pub fn update(&mut self, viewer_position: Vec2, host: &mut dyn TerrainHost) {
        self.apply_completed(host);
        self.viewer_position = viewer_position;

        if self.last_scan_position != Some(viewer_position) {
            let visible = self.visible_chunks.clone();
            for coord in visible {
                self.update_collider(coord, host);
            }
        }

        let scan_due = match self.last_scan_position {
            None => true,
            Some(prev) => prev.distance_squared(viewer_position) > SQR_VIEWER_MOVE_THRESHOLD,
        };
        if scan_due {
            self.last_scan_position = Some(viewer_position);
            self.scan(host);
        }
    }

    /// Number of chunks currently resident in the registry.
    pub fn resident_chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Number of chunks currently visible.
    pub fn visible_chunk_count(&self) -> usize {
        self.visible_chunks.len()
    }

    /// Background jobs submitted but not yet finished.
    pub fn in_flight(&self) -> usize {
        self.queue.in_flight()
    }

    fn apply_completed(&mut self, host: &mut dyn TerrainHost) {
        for result in self.queue.drain_completed() {
            match result {
                ChunkWorkResult::HeightMap {
                    coord,
                    rev,
                    height_map,
                } => {
                    let applied = match self.chunks.get_mut(&coord) {
                        Some(chunk) if chunk.rev == rev => {
                            let height_map = Arc::new(height_map);
                            chunk.height_map = Some(Arc::clone(&height_map));
                            Some(height_map)
                        }
                        _ => None,
                    };
                    match applied {
                        Some(height_map) => {
                            host.height_map_ready(coord, &height_map);
                            self.update_chunk(coord, host);
                        }
                        None => {
                            trace!(x = coord.x, y = coord.y, "dropped stale height map")
                        }
                    }
                }
                ChunkWorkResult::Mesh {
                    coord,
                    rev,
                    lod_index,
                    mesh,
                } => {
                    let applied = match self.chunks.get_mut(&coord) {
                        Some(chunk) if chunk.rev == rev => {
                            chunk.lod_meshes[lod_index].mesh = Some(Arc::new(mesh));
                            true
                        }
                        _ => false,
                    };
                    if applied {
                        self.update_chunk(coord, host);
                        if lod_index == self.collider_lod_index {
                            self.update_collider(coord, host);
                        }
                    } else {
                        trace!(x = coord.x, y = coord.y, lod_index, "dropped stale mesh");
                    }
                }
            }
        }
    }

    /// Re-evaluate every chunk in the candidate window around the viewer,
    /// creating missing ones, then drop chunks outside the retention window.
    fn scan(&mut self, host: &mut dyn TerrainHost) {
        let mut already_updated: HashSet<ChunkCoord> = HashSet::new();
        let visible = self.visible_chunks.clone();
        for coord in visible {
            already_updated.insert(coord);
            self.update_chunk(coord, host);
        }

        let world_size = self.mesh_settings.mesh_world_size();
        let current = ChunkCoord::new(
            (self.viewer_position.x / world_size).round() as i32,
            (self.viewer_position.y / world_size).round() as i32,
        );

        for y_offset in -self.chunks_in_view..=self.chunks_in_view {
            for x_offset in -self.chunks_in_view..=self.chunks_in_view {
                let coord = ChunkCoord::new(current.x + x_offset, current.y + y_offset);
                if already_updated.contains(&coord) {
                    continue;
                }
                if self.chunks.contains_key(&coord) {
                    self.update_chunk(coord, host);
                } else {
                    self.create_chunk(coord);
                }
            }
        }

        self.evict_distant(current, host);
    }

    /// Register a new chunk and issue its one-shot height map request.
    fn create_chunk(&mut self, coord: ChunkCoord) {
        let rev = self.next_rev;
        self.next_rev += 1;
        let chunk = TerrainChunk::new(
            coord,
            self.mesh_settings.mesh_world_size(),
            self.mesh_settings.mesh_scale,
            self.detail_levels.len(),
            rev,
        );
        let sample_center = chunk.sample_center;
        self.chunks.insert(coord, chunk);
        debug!(x = coord.x, y = coord.y, "chunk created");

        let settings = self.height_map_settings.clone();
        let side = self.mesh_settings.num_verts_per_line();
        self.queue.submit(move || ChunkWorkResult::HeightMap {
            coord,
            rev,
            height_map: generate_height_map(side, side, &settings, sample_center),
        });
    }

    fn evict_distant(&mut self, current: ChunkCoord, host: &mut dyn TerrainHost) {
        let keep = self.chunks_in_view + self.eviction_margin;
        let evicted: Vec<ChunkCoord> = self
            .chunks
            .keys()
            .filter(|coord| coord.chebyshev_distance(current) > keep)
            .copied()
            .collect();
        for coord in evicted {
            if let Some(chunk) = self.chunks.remove(&coord) {
                if chunk.visible {
                    self.visible_chunks.retain(|c| *c != coord);
                    host.set_visible(chunk.coord, false);
                }
                debug!(x = chunk.coord.x, y = chunk.coord.y, "chunk evicted");
            }
        }
    }

    /// Recompute one chunk's visibility and LOD. No-op until the chunk's
    /// height map has arrived.
    fn update_chunk(&mut self, coord: ChunkCoord, host: &mut dyn TerrainHost) {
        let Some(chunk) = self.chunks.get_mut(&coord) else {
            return;
        };
        let Some(height_map) = chunk.height_map.clone() else {
            return;
        };

        let distance = chunk.bounds.sqr_distance(self.viewer_position).sqrt();
        let was_visible = chunk.visible;
        let visible = distance <= self.max_view_distance;

        if visible {
            let lod_index = select_lod_index(&self.detail_levels, distance);
            if chunk.prev_lod_index != Some(lod_index) {
                if let Some(mesh) = chunk.lod_meshes[lod_index].mesh.clone() {
                    chunk.prev_lod_index = Some(lod_index);
                    host.attach_mesh(coord, &mesh);
                } else if !chunk.lod_meshes[lod_index].requested {
                    chunk.lod_meshes[lod_index].requested = true;
                    let rev = chunk.rev;
                    let lod = self.detail_levels[lod_index].lod;
                    let mesh_settings = self.mesh_settings.clone();
                    self.queue.submit(move || ChunkWorkResult::Mesh {
                        coord,
                        rev,
                        lod_index,
                        mesh: build_terrain_mesh(&height_map.values, &mesh_settings, lod),
                    });
                }
            }
        }

        if was_visible != visible {
            chunk.visible = visible;
            if visible {
                self.visible_chunks.push(coord);
            } else {
                self.visible_chunks.retain(|c| *c != coord);
            }
            host.set_visible(coord, visible);
            debug!(x = coord.x, y = coord.y, visible, "chunk visibility changed");
        }
    }

    /// Request and install the chunk's collision mesh. The mesh is requested
    /// inside the collider band; the swap itself waits until the viewer is
    /// within [`COLLIDER_GENERATION_DISTANCE`] and happens at most once.
    fn update_collider(&mut self, coord: ChunkCoord, host: &mut dyn TerrainHost) {
        let collider_index = self.collider_lod_index;
        let Some(chunk) = self.chunks.get_mut(&coord) else {
            return;
        };
        if chunk.has_set_collider {
            return;
        }
        let Some(height_map) = chunk.height_map.clone() else {
            return;
        };

        let sqr_dst = chunk.bounds.sqr_distance(self.viewer_position);

        if sqr_dst < self.detail_levels[collider_index].sqr_visible_dst_threshold()
            && !chunk.lod_meshes[collider_index].requested
        {
            chunk.lod_meshes[collider_index].requested = true;
            let rev = chunk.rev;
            let lod = self.detail_levels[collider_index].lod;
            let mesh_settings = self.mesh_settings.clone();
            self.queue.submit(move || ChunkWorkResult::Mesh {
                coord,
                rev,
                lod_index: collider_index,
                mesh: build_terrain_mesh(&height_map.values, &mesh_settings, lod),
            });
        }

        if sqr_dst < COLLIDER_GENERATION_DISTANCE * COLLIDER_GENERATION_DISTANCE
            && let Some(mesh) = chunk.lod_meshes[collider_index].mesh.clone()
        {
            chunk.has_set_collider = true;
            host.set_collider(coord, &mesh);
            debug!(x = coord.x, y = coord.y, "collider set");
        }
    }
}

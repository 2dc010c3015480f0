//! Headless demo that streams terrain around a scripted viewer.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI
//! flags. Run with `cargo run -p veld-demo` for the default walk, or
//! `cargo run -p veld-demo -- --seed 7 --steps 500` to customize it.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use glam::Vec2;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use veld_compute::ComputeQueue;
use veld_config::{CliArgs, ConfigError, TerrainConfig};
use veld_heightfield::HeightMap;
use veld_mesh::MeshData;
use veld_stream::{ChunkCoord, TerrainHost, TerrainStreamer};

/// Counts and logs the streamer's host-side effects in place of a renderer.
#[derive(Default)]
struct TracingHost {
    meshes_attached: usize,
    colliders_set: usize,
    visibility_events: usize,
    height_maps: usize,
}

impl TerrainHost for TracingHost {
    fn attach_mesh(&mut self, coord: ChunkCoord, mesh: &MeshData) {
        self.meshes_attached += 1;
        debug!(
            x = coord.x,
            y = coord.y,
            vertices = mesh.vertices.len(),
            triangles = mesh.triangle_count(),
            "mesh attached"
        );
    }

    fn set_collider(&mut self, coord: ChunkCoord, mesh: &MeshData) {
        self.colliders_set += 1;
        debug!(
            x = coord.x,
            y = coord.y,
            triangles = mesh.triangle_count(),
            "collider set"
        );
    }

    fn set_visible(&mut self, coord: ChunkCoord, visible: bool) {
        self.visibility_events += 1;
        debug!(x = coord.x, y = coord.y, visible, "visibility changed");
    }

    fn height_map_ready(&mut self, coord: ChunkCoord, height_map: &HeightMap) {
        self.height_maps += 1;
        debug!(
            x = coord.x,
            y = coord.y,
            min = height_map.min_value,
            max = height_map.max_value,
            "height map ready"
        );
    }
}

fn init_logging(config: &TerrainConfig) {
    let filter = if config.debug.log_level.is_empty() {
        "info".to_string()
    } else {
        config.debug.log_level.clone()
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

fn main() -> Result<(), ConfigError> {
    let args = CliArgs::parse();

    let config_dir = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from("config"));
    let mut config = TerrainConfig::load_or_create(&config_dir)?;
    config.apply_cli_overrides(&args);
    config.validate()?;
    init_logging(&config);

    let queue = if config.stream.worker_threads == 0 {
        ComputeQueue::with_default_threads()
    } else {
        ComputeQueue::new(config.stream.worker_threads)
    };
    let mut streamer = TerrainStreamer::new(
        config.height_map,
        config.mesh,
        config.detail_levels,
        config.collider_lod_index,
        queue,
    )
    .with_eviction_margin(config.stream.eviction_margin);
    let mut host = TracingHost::default();

    let steps = args.steps.unwrap_or(240);
    let step_size = 4.0;
    let direction = Vec2::new(1.0, 0.4).normalize();
    info!(steps, step_size, "starting scripted viewer walk");

    for step in 0..steps {
        let position = direction * (step as f32 * step_size);
        streamer.update(position, &mut host);
        std::thread::sleep(Duration::from_millis(15));
    }

    // Let in-flight generation finish so the summary reflects a quiet world.
    let final_position = direction * (steps.saturating_sub(1) as f32 * step_size);
    let deadline = Instant::now() + Duration::from_secs(60);
    while streamer.in_flight() > 0 {
        if Instant::now() > deadline {
            warn!(
                in_flight = streamer.in_flight(),
                "generation did not settle before the deadline"
            );
            break;
        }
        streamer.update(final_position, &mut host);
        std::thread::sleep(Duration::from_millis(10));
    }
    streamer.update(final_position, &mut host);

    info!(
        resident_chunks = streamer.resident_chunk_count(),
        visible_chunks = streamer.visible_chunk_count(),
        height_maps = host.height_maps,
        meshes_attached = host.meshes_attached,
        colliders_set = host.colliders_set,
        visibility_events = host.visibility_events,
        "walk complete"
    );
    Ok(())
}

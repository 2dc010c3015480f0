//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::TerrainConfig;

/// Terrain streaming demo command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "veld", about = "Endless terrain streaming demo")]
pub struct CliArgs {
    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// World seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Use flat shading.
    #[arg(long)]
    pub flat_shading: Option<bool>,

    /// Chunk size index.
    #[arg(long)]
    pub chunk_size_index: Option<usize>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Number of simulation steps to run.
    #[arg(long)]
    pub steps: Option<u32>,
}

impl TerrainConfig {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(seed) = args.seed {
            self.height_map.noise.seed = seed;
        }
        if let Some(flat) = args.flat_shading {
            self.mesh.use_flat_shading = flat;
        }
        if let Some(index) = args.chunk_size_index {
            self.mesh.chunk_size_index = index;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = TerrainConfig::default();
        let args = CliArgs {
            seed: Some(77),
            flat_shading: Some(true),
            ..CliArgs::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.height_map.noise.seed, 77);
        assert!(config.mesh.use_flat_shading);
        // Non-overridden fields retain defaults.
        assert_eq!(config.debug.log_level, "info");
    }

    #[test]
    fn test_cli_no_override() {
        let original = TerrainConfig::default();
        let mut config = TerrainConfig::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::parse_from([
            "veld",
            "--seed",
            "42",
            "--log-level",
            "debug",
            "--steps",
            "100",
        ]);
        assert_eq!(args.seed, Some(42));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert_eq!(args.steps, Some(100));
    }
}

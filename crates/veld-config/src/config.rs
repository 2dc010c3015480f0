//! Configuration structs with sensible defaults and RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;
use veld_heightfield::HeightMapSettings;
use veld_mesh::{
    MeshSettings, NUM_SUPPORTED_CHUNK_SIZES, NUM_SUPPORTED_FLAT_SHADED_CHUNK_SIZES,
    NUM_SUPPORTED_LODS,
};
use veld_stream::LodBand;

use crate::error::ConfigError;

/// Top-level terrain configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// Height map generation settings.
    pub height_map: HeightMapSettings,
    /// Mesh construction settings.
    pub mesh: MeshSettings,
    /// LOD distance bands, nearest first.
    pub detail_levels: Vec<LodBand>,
    /// Which detail level supplies collision meshes.
    pub collider_lod_index: usize,
    /// Streaming settings.
    pub stream: StreamConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Streaming configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamConfig {
    /// Chunks kept beyond the candidate window before eviction.
    pub eviction_margin: i32,
    /// Worker thread count, 0 for automatic sizing.
    pub worker_threads: usize,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "error", "warn", "info", "debug", "trace").
    pub log_level: String,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            height_map: HeightMapSettings::default(),
            mesh: MeshSettings::default(),
            detail_levels: vec![
                LodBand::new(0, 150.0),
                LodBand::new(1, 250.0),
                LodBand::new(4, 400.0),
            ],
            collider_lod_index: 0,
            stream: StreamConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            eviction_margin: 2,
            worker_threads: 0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl TerrainConfig {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents =
                std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: TerrainConfig =
                ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            info!("loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = TerrainConfig::default();
            config.save(config_dir)?;
            info!("created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: TerrainConfig =
            ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            info!("config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Reject setups the streamer cannot run. Range clamping of individual
    /// settings happens later via their `validated()` methods; this catches
    /// structural problems that clamping cannot repair.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.detail_levels.is_empty() {
            return Err(ConfigError::Invalid(
                "detail_levels must contain at least one band".to_string(),
            ));
        }
        for band in &self.detail_levels {
            if band.lod >= NUM_SUPPORTED_LODS {
                return Err(ConfigError::Invalid(format!(
                    "detail level LOD {} outside supported range 0..{NUM_SUPPORTED_LODS}",
                    band.lod
                )));
            }
            if band.visible_dst_threshold <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "detail level threshold {} must be positive",
                    band.visible_dst_threshold
                )));
            }
        }
        for pair in self.detail_levels.windows(2) {
            if pair[0].visible_dst_threshold >= pair[1].visible_dst_threshold {
                return Err(ConfigError::Invalid(format!(
                    "detail level thresholds must be strictly increasing ({} then {})",
                    pair[0].visible_dst_threshold, pair[1].visible_dst_threshold
                )));
            }
        }
        if self.collider_lod_index >= self.detail_levels.len() {
            return Err(ConfigError::Invalid(format!(
                "collider_lod_index {} outside the {} detail levels",
                self.collider_lod_index,
                self.detail_levels.len()
            )));
        }
        let size_limit = if self.mesh.use_flat_shading {
            NUM_SUPPORTED_FLAT_SHADED_CHUNK_SIZES
        } else {
            NUM_SUPPORTED_CHUNK_SIZES
        };
        if self.mesh.chunk_size_index >= size_limit {
            return Err(ConfigError::Invalid(format!(
                "chunk_size_index {} outside the supported range 0..{size_limit}",
                self.mesh.chunk_size_index
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        TerrainConfig::default().validate().unwrap();
    }

    #[test]
    fn test_default_config_serializes() {
        let config = TerrainConfig::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(4))
                .unwrap();
        assert!(ron_str.contains("height_multiplier"));
        assert!(ron_str.contains("detail_levels"));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = TerrainConfig::default();
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: TerrainConfig = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(collider_lod_index: 1)";
        let config: TerrainConfig = ron::from_str(ron_str).unwrap();
        assert_eq!(config.collider_lod_index, 1);
        assert_eq!(config.stream, StreamConfig::default());
        assert_eq!(config.mesh, MeshSettings::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let ron_str = "(future_setting: true)";
        let result: Result<TerrainConfig, _> = ron::from_str(ron_str);
        assert!(result.is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = TerrainConfig::default();
        config.height_map.noise.seed = 1234;
        config.stream.eviction_margin = 5;

        config.save(dir.path()).unwrap();
        let loaded = TerrainConfig::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = TerrainConfig::load_or_create(dir.path()).unwrap();
        assert_eq!(config, TerrainConfig::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = TerrainConfig::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.height_map.noise.seed = 99;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.unwrap().height_map.noise.seed, 99);
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = TerrainConfig::default();
        config.save(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_validate_rejects_non_increasing_thresholds() {
        let config = TerrainConfig {
            detail_levels: vec![LodBand::new(0, 200.0), LodBand::new(1, 150.0)],
            ..TerrainConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_collider_index_out_of_range() {
        let config = TerrainConfig {
            collider_lod_index: 9,
            ..TerrainConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_flat_shaded_large_chunks() {
        let mut config = TerrainConfig::default();
        config.mesh.use_flat_shading = true;
        config.mesh.chunk_size_index = 8;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let result: Result<TerrainConfig, _> = ron::from_str("{{not valid}}");
        assert!(result.is_err());
    }
}

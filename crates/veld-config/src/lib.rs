//! Terrain configuration: RON persistence, CLI overrides, validation.
//!
//! Settings persist to `config.ron`; missing fields fall back to defaults,
//! unknown fields are ignored, so config files stay forward and backward
//! compatible across versions.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{DebugConfig, StreamConfig, TerrainConfig};
pub use error::ConfigError;

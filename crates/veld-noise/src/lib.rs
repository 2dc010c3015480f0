//! Deterministic fractal noise sampling into 2D height fields.
//!
//! Layers multiple octaves of Perlin noise with per-octave offsets drawn from
//! a seeded RNG, so that two samplers built from the same settings produce
//! bit-identical grids. Supports two normalization modes: `Local` (rescale by
//! the grid's own min/max, exact but window-dependent) and `Global` (divide by
//! the theoretical amplitude sum, which composes seamlessly across windows and
//! is what endless streaming requires).

mod fractal;
mod grid;

pub use fractal::{NoiseSettings, NormalizeMode, generate_noise_map};
pub use grid::Grid2;

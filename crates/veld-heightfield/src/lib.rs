//! Bordered height-field generation: fractal noise shaped by a height
//! response curve, a height multiplier, and an optional edge falloff mask.
//!
//! A height map is generated once per (chunk, sample center) and is immutable
//! afterwards; the recorded min/max let collaborators do texture-threshold
//! blending without rescanning the grid.

mod curve;
mod falloff;
mod height_map;

pub use curve::{CurveKey, HeightCurve};
pub use falloff::{evaluate_falloff, generate_falloff_map};
pub use height_map::{HeightMap, HeightMapSettings, generate_height_map};

//! Height map generation: noise window, optional falloff, curve and multiplier.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use veld_noise::{Grid2, NoiseSettings, generate_noise_map};

use crate::curve::HeightCurve;
use crate::falloff::generate_falloff_map;

/// Settings describing how raw noise becomes terrain height.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightMapSettings {
    /// Fractal noise parameters.
    pub noise: NoiseSettings,
    /// Response curve applied to the normalized noise value.
    pub height_curve: HeightCurve,
    /// Vertical scale applied after the curve. Clamped to at least 1.
    pub height_multiplier: f32,
    /// Subtract an edge falloff mask before shaping, producing one bounded
    /// landmass instead of endless terrain.
    pub use_falloff: bool,
}

impl Default for HeightMapSettings {
    fn default() -> Self {
        Self {
            noise: NoiseSettings::default(),
            height_curve: HeightCurve::from_keys(vec![
                (0.0, 0.0),
                (0.4, 0.1),
                (0.7, 0.6),
                (1.0, 1.0),
            ]),
            height_multiplier: 50.0,
            use_falloff: false,
        }
    }
}

impl HeightMapSettings {
    /// Return a copy with every field clamped into its valid range.
    pub fn validated(mut self) -> Self {
        self.noise = self.noise.validated();
        self.height_multiplier = self.height_multiplier.max(1.0);
        self.height_curve.normalize();
        self
    }

    /// Smallest height these settings can produce.
    pub fn min_height(&self) -> f32 {
        self.height_multiplier * self.height_curve.evaluate(0.0)
    }

    /// Largest height these settings can produce.
    pub fn max_height(&self) -> f32 {
        self.height_multiplier * self.height_curve.evaluate(1.0)
    }
}

/// A generated, bordered height grid with its observed extrema.
///
/// Immutable after construction; the min/max drive texture-threshold
/// blending host-side.
#[derive(Clone, Debug)]
pub struct HeightMap {
    /// Height values, `(vertices per line + 2)` on a side for chunk use.
    pub values: Grid2,
    /// Smallest value in `values`.
    pub min_value: f32,
    /// Largest value in `values`.
    pub max_value: f32,
}

/// Generate a `width` x `height` height map centered on `sample_center`.
///
/// Chunked callers pass the bordered grid side (two extra rows/columns) so
/// mesh normals can be seam-corrected later.
pub fn generate_height_map(
    width: usize,
    height: usize,
    settings: &HeightMapSettings,
    sample_center: Vec2,
) -> HeightMap {
    let mut values = generate_noise_map(width, height, &settings.noise, sample_center);

    if settings.use_falloff {
        assert_eq!(width, height, "falloff maps require a square grid");
        let falloff = generate_falloff_map(width);
        for y in 0..height {
            for x in 0..width {
                let masked = (values.get(x, y) - falloff.get(x, y)).clamp(0.0, 1.0);
                values.set(x, y, masked);
            }
        }
    }

    let mut min_value = f32::MAX;
    let mut max_value = f32::MIN;
    for y in 0..height {
        for x in 0..width {
            let shaped =
                settings.height_curve.evaluate(values.get(x, y)) * settings.height_multiplier;
            min_value = min_value.min(shaped);
            max_value = max_value.max(shaped);
            values.set(x, y, shaped);
        }
    }

    HeightMap {
        values,
        min_value,
        max_value,
    }
}

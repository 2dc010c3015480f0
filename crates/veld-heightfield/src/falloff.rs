//! Edge falloff mask used to carve a single bounded landmass.

use veld_noise::Grid2;

const FALLOFF_SHARPNESS: f32 = 3.0;
const FALLOFF_OFFSET: f32 = 2.2;

/// Evaluate the falloff response for `t` in `[0, 1]`.
///
/// `t^a / (t^a + (b - b*t)^a)` stays near 0 over most of the interval and
/// saturates toward 1 as `t` approaches the edge.
pub fn evaluate_falloff(t: f32) -> f32 {
    let a = FALLOFF_SHARPNESS;
    let b = FALLOFF_OFFSET;
    t.powf(a) / (t.powf(a) + (b - b * t).powf(a))
}

/// Generate a square `size` x `size` falloff mask.
///
/// Each cell maps to normalized coordinates `u, v` in `[-1, 1]`; the mask
/// value is the falloff response of `max(|u|, |v|)`, so it is ~0 at the
/// center and ~1 along the edges. Subtracting it from a noise field forces
/// heights toward zero near the map boundary.
pub fn generate_falloff_map(size: usize) -> Grid2 {
    let mut map = Grid2::new(size, size);
    for y in 0..size {
        for x in 0..size {
            let u = x as f32 / size as f32 * 2.0 - 1.0;
            let v = y as f32 / size as f32 * 2.0 - 1.0;
            let t = u.abs().max(v.abs());
            map.set(x, y, evaluate_falloff(t));
        }
    }
    map
}

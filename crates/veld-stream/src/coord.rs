//! Chunk addressing and world-space chunk bounds.

use glam::Vec2;

/// Integer chunk coordinate on the infinite chunk lattice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
}

impl ChunkCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance, matching the square candidate window.
    pub fn chebyshev_distance(self, other: ChunkCoord) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

/// Axis-aligned box on the ground plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds2 {
    pub center: Vec2,
    pub extents: Vec2,
}

impl Bounds2 {
    /// Bounds from a center and full side lengths.
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self {
            center,
            extents: size * 0.5,
        }
    }

    /// Squared distance from `point` to the closest point of the bounds.
    /// Zero when the point is inside.
    pub fn sqr_distance(&self, point: Vec2) -> f32 {
        let delta = ((point - self.center).abs() - self.extents).max(Vec2::ZERO);
        delta.length_squared()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqr_distance_zero_inside() {
        let bounds = Bounds2::new(Vec2::new(10.0, -4.0), Vec2::splat(8.0));
        assert_eq!(bounds.sqr_distance(Vec2::new(10.0, -4.0)), 0.0);
        assert_eq!(bounds.sqr_distance(Vec2::new(13.9, -0.1)), 0.0);
    }

    #[test]
    fn test_sqr_distance_along_axis() {
        let bounds = Bounds2::new(Vec2::ZERO, Vec2::splat(10.0));
        // Closest edge is at x = 5, so a point at x = 8 is 3 away.
        assert!((bounds.sqr_distance(Vec2::new(8.0, 0.0)) - 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_sqr_distance_to_corner() {
        let bounds = Bounds2::new(Vec2::ZERO, Vec2::splat(10.0));
        // 3 beyond the corner on both axes.
        assert!((bounds.sqr_distance(Vec2::new(8.0, 8.0)) - 18.0).abs() < 1e-6);
    }

    #[test]
    fn test_chebyshev_distance() {
        let a = ChunkCoord::new(-2, 3);
        let b = ChunkCoord::new(1, 1);
        assert_eq!(a.chebyshev_distance(b), 3);
        assert_eq!(b.chebyshev_distance(a), 3);
        assert_eq!(a.chebyshev_distance(a), 0);
    }
}

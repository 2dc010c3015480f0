//! Row-major 2D float grid shared by the noise, heightfield, and mesh crates.

/// A dense, row-major grid of `f32` values.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid2 {
    width: usize,
    height: usize,
    values: Vec<f32>,
}

impl Grid2 {
    /// Create a zero-filled grid of the given dimensions.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            values: vec![0.0; width * height],
        }
    }

    /// Grid width in samples.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in samples.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Value at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is out of bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        assert!(x < self.width && y < self.height, "grid access out of bounds");
        self.values[y * self.width + x]
    }

    /// Set the value at `(x, y)`.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        assert!(x < self.width && y < self.height, "grid access out of bounds");
        self.values[y * self.width + x] = value;
    }

    /// The raw row-major backing slice.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Observed `(min, max)` over all cells. Returns `(0.0, 0.0)` for an
    /// empty grid.
    pub fn min_max(&self) -> (f32, f32) {
        let mut min = f32::MAX;
        let mut max = f32::MIN;
        for &v in &self.values {
            if v < min {
                min = v;
            }
            if v > max {
                max = v;
            }
        }
        if self.values.is_empty() {
            (0.0, 0.0)
        } else {
            (min, max)
        }
    }

    /// Apply `f` to every cell in place.
    pub fn map_in_place(&mut self, mut f: impl FnMut(f32) -> f32) {
        for v in &mut self.values {
            *v = f(*v);
        }
    }
}

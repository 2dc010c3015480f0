//! Piecewise-linear height response curve sampled over `[0, 1]`.

use serde::{Deserialize, Serialize};

/// One key of a [`HeightCurve`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    /// Position along the input axis, conventionally in `[0, 1]`.
    pub t: f32,
    /// Curve value at `t`.
    pub value: f32,
}

/// A keyed, piecewise-linear response curve.
///
/// Keys are kept sorted by `t`; evaluation clamps to the first/last key
/// outside the keyed range. Monotonicity is by convention, not enforced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeightCurve {
    keys: Vec<CurveKey>,
}

impl Default for HeightCurve {
    fn default() -> Self {
        Self::linear()
    }
}

impl HeightCurve {
    /// The identity curve: `f(t) = t`.
    pub fn linear() -> Self {
        Self {
            keys: vec![
                CurveKey { t: 0.0, value: 0.0 },
                CurveKey { t: 1.0, value: 1.0 },
            ],
        }
    }

    /// Build a curve from `(t, value)` pairs. Keys are sorted by `t`.
    ///
    /// # Panics
    ///
    /// Panics if `keys` is empty.
    pub fn from_keys(keys: Vec<(f32, f32)>) -> Self {
        assert!(!keys.is_empty(), "a height curve needs at least one key");
        let mut keys: Vec<CurveKey> = keys
            .into_iter()
            .map(|(t, value)| CurveKey { t, value })
            .collect();
        keys.sort_by(|a, b| a.t.total_cmp(&b.t));
        Self { keys }
    }

    /// Restore the sorted-keys invariant, substituting the identity curve if
    /// the key list is empty. Used when a curve arrives from deserialized
    /// configuration.
    pub fn normalize(&mut self) {
        if self.keys.is_empty() {
            *self = Self::linear();
        } else {
            self.keys.sort_by(|a, b| a.t.total_cmp(&b.t));
        }
    }

    /// Evaluate the curve at `t`, clamping outside the keyed range.
    pub fn evaluate(&self, t: f32) -> f32 {
        let first = self.keys[0];
        let last = self.keys[self.keys.len() - 1];
        if t <= first.t {
            return first.value;
        }
        if t >= last.t {
            return last.value;
        }
        for pair in self.keys.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.t {
                let span = b.t - a.t;
                if span <= 0.0 {
                    return b.value;
                }
                let alpha = (t - a.t) / span;
                return a.value + (b.value - a.value) * alpha;
            }
        }
        last.value
    }

    /// The sorted key list.
    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }
}

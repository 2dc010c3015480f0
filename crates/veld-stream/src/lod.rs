//! Distance-banded LOD selection.

use serde::{Deserialize, Serialize};
use veld_mesh::NUM_SUPPORTED_LODS;

/// One LOD band: the mesh detail level used while the viewer is within
/// `visible_dst_threshold` of the chunk edge (and beyond the previous band).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LodBand {
    /// Mesh simplification level, `0..NUM_SUPPORTED_LODS`.
    pub lod: u32,
    /// Outer edge of this band, in world units from the chunk edge.
    pub visible_dst_threshold: f32,
}

impl LodBand {
    pub fn new(lod: u32, visible_dst_threshold: f32) -> Self {
        Self {
            lod,
            visible_dst_threshold,
        }
    }

    pub fn sqr_visible_dst_threshold(&self) -> f32 {
        self.visible_dst_threshold * self.visible_dst_threshold
    }
}

/// Index of the band covering `distance`: the first band whose threshold is
/// not exceeded, with the last band as catch-all.
pub fn select_lod_index(bands: &[LodBand], distance: f32) -> usize {
    let mut index = 0;
    for (i, band) in bands.iter().enumerate().take(bands.len() - 1) {
        if distance > band.visible_dst_threshold {
            index = i + 1;
        } else {
            break;
        }
    }
    index
}

/// Panics on an empty band list, non-increasing thresholds, or a detail
/// level outside the supported mesh LOD range.
pub(crate) fn validate_bands(bands: &[LodBand]) {
    assert!(!bands.is_empty(), "at least one LOD band is required");
    for band in bands {
        assert!(
            band.lod < NUM_SUPPORTED_LODS,
            "LOD {} outside supported range 0..{NUM_SUPPORTED_LODS}",
            band.lod
        );
        assert!(
            band.visible_dst_threshold > 0.0,
            "LOD band thresholds must be positive"
        );
    }
    for pair in bands.windows(2) {
        assert!(
            pair[0].visible_dst_threshold < pair[1].visible_dst_threshold,
            "LOD band thresholds must be strictly increasing ({} then {})",
            pair[0].visible_dst_threshold,
            pair[1].visible_dst_threshold
        );
    }
}

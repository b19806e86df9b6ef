use crate::io::error::{Result, invalid_parameter};

/// Cheap mean-color rejection ahead of the full distance computation
///
/// Tiles whose mean differs from the region mean by more than the threshold
/// are never compared. A tile can be skipped even though its true distance
/// would have been competitive; lowering the threshold trades accuracy for
/// fewer comparisons.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeanColorPrefilter {
    threshold: f64,
}

impl MeanColorPrefilter {
    /// Create a prefilter with the given mean-color threshold
    ///
    /// # Errors
    ///
    /// Returns an error if the threshold is negative or not finite
    pub fn new(threshold: f64) -> Result<Self> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(invalid_parameter(
                "compare_dist",
                &threshold,
                &"must be a finite non-negative number",
            ));
        }
        Ok(Self { threshold })
    }

    /// Maximum admitted mean-color delta
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Test whether a tile passes on to the distance metric
    ///
    /// A delta exactly equal to the threshold passes.
    pub fn admits(&self, region_mean: f64, tile_mean: f64) -> bool {
        (region_mean - tile_mean).abs() <= self.threshold
    }
}

//! Build constants and runtime configuration defaults

use crate::imaging::CropMode;
use crate::io::error::{Result, invalid_parameter};

// Default values for configurable parameters
/// Edge length of the shorter side of the output canvas
pub const DEFAULT_OUTPUT_SIZE: u32 = 2000;
/// Edge length of each composited tile
pub const DEFAULT_TILE_SIZE: u32 = 100;
/// Edge length of comparison proxies
pub const DEFAULT_COMPARE_SIZE: u32 = 50;
/// Maximum mean-color delta for a tile to be considered a candidate
pub const DEFAULT_COMPARE_DIST: f64 = 30.0;
/// Number of threads evaluating candidates for one region
pub const DEFAULT_WORKERS: usize = 32;
/// Number of threads rendering cache entries during import
pub const DEFAULT_IMPORT_WORKERS: usize = 8;
/// Label under which cached tiles are stored
pub const DEFAULT_CACHE_LABEL: &str = "tesselate";
/// Default output file name
pub const DEFAULT_OUTPUT: &str = "mosaic.jpg";

// Safety limit to prevent excessive memory allocation
/// Maximum allowed output edge length
pub const MAX_OUTPUT_SIZE: u32 = 50_000;

/// Distance reported for "no match yet"; no valid comparison can reach it
pub const WORST_DISTANCE: f64 = 1.0;

// Tile preparation
/// Per-channel tolerance when trimming a uniform frame from tiles
pub const TRIM_TOLERANCE: u8 = 40;
/// Frame color trimmed from tiles
pub const TRIM_BACKGROUND: [u8; 3] = [255, 255, 255];

// Output settings
/// JPEG quality of the finished mosaic
pub const OUTPUT_JPEG_QUALITY: u8 = 85;
/// JPEG quality of pre-rendered cache entries
pub const CACHE_JPEG_QUALITY: u8 = 90;
/// Separator between the components of a cache key
pub const CACHE_KEY_SEPARATOR: char = '_';

/// Knobs consumed by a mosaic build
#[derive(Clone, Debug)]
pub struct MosaicConfig {
    /// Shorter side of the canvas after scaling the master image
    pub output_size: u32,
    /// Edge length of each region and of each composited tile
    pub tile_size: u32,
    /// Edge length of comparison proxies
    pub compare_size: u32,
    /// Mean-color prefilter threshold (0–255 scale)
    pub compare_dist: f64,
    /// Use each tile at most once
    pub unique: bool,
    /// Number of candidate-evaluation threads
    pub workers: usize,
    /// Seed for the region visitation order; drawn at random when absent
    pub seed: Option<u64>,
    /// How region proxies are cropped to the comparison size
    pub crop_mode: CropMode,
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            output_size: DEFAULT_OUTPUT_SIZE,
            tile_size: DEFAULT_TILE_SIZE,
            compare_size: DEFAULT_COMPARE_SIZE,
            compare_dist: DEFAULT_COMPARE_DIST,
            unique: true,
            workers: DEFAULT_WORKERS,
            seed: None,
            crop_mode: CropMode::default(),
        }
    }
}

impl MosaicConfig {
    /// Check every knob before any work starts
    ///
    /// # Errors
    ///
    /// Returns [`crate::MosaicError::InvalidParameter`] if:
    /// - Any size is zero or the output size exceeds [`MAX_OUTPUT_SIZE`]
    /// - The compare distance is negative or not finite
    /// - The worker count is zero
    pub fn validate(&self) -> Result<()> {
        for (parameter, value) in [
            ("output_size", self.output_size),
            ("tile_size", self.tile_size),
            ("compare_size", self.compare_size),
        ] {
            if value == 0 {
                return Err(invalid_parameter(parameter, &value, &"must be positive"));
            }
        }

        if self.output_size > MAX_OUTPUT_SIZE {
            return Err(invalid_parameter(
                "output_size",
                &self.output_size,
                &format!("must not exceed {MAX_OUTPUT_SIZE}"),
            ));
        }

        if !self.compare_dist.is_finite() || self.compare_dist < 0.0 {
            return Err(invalid_parameter(
                "compare_dist",
                &self.compare_dist,
                &"must be a finite, non-negative number",
            ));
        }

        if self.workers == 0 {
            return Err(invalid_parameter(
                "workers",
                &self.workers,
                &"at least one worker is required",
            ));
        }

        Ok(())
    }
}

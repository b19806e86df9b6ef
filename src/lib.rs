//! Photo mosaic assembly: every region of a master image is replaced by the
//! closest-matching tile from a corpus of small images
//!
//! Regions are visited in a seeded random order. For each one a pool of
//! workers scans the live corpus through a mean-color prefilter and a
//! normalized Manhattan distance, and the winner is composited into the
//! canvas, optionally retiring it so no tile is used twice.

#![forbid(unsafe_code)]

/// Matching engine: distance metric, prefilter, parallel reducer and assembly
pub mod algorithm;
/// Image loading, cropping, color statistics and codecs
pub mod imaging;
/// Configuration, errors, tile stores, logging, progress and the CLI
pub mod io;
/// Tile corpus, tile records and region planning
pub mod spatial;

pub use algorithm::distance::compare_distance;
pub use algorithm::executor::{Mosaic, MosaicExecutor, build};
pub use io::configuration::MosaicConfig;
pub use io::error::{MosaicError, Result};

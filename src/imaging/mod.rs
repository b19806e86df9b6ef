//! Image-processing primitives used to prepare proxies, tiles and the canvas
//!
//! This module contains:
//! - Loading, trimming, resizing and color statistics
//! - Attention-weighted crop window selection
//! - JPEG and PNG codecs for in-memory tile data

/// Loading, resizing, trimming, color statistics and codecs
pub mod ops;
/// Attention-weighted crop window selection
pub mod saliency;

pub use ops::{CropMode, ProxyImage};

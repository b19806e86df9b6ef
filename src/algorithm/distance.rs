//! Normalized channel-wise Manhattan distance between pixel grids

use crate::imaging::ProxyImage;
use crate::io::error::{MosaicError, Result, incompatible_images};
use image::{DynamicImage, GenericImageView, Pixel, Primitive};
use num_traits::ToPrimitive;

/// Distance in `[0, 1]` between two equally sized views
///
/// Sums `|ΔR| + |ΔG| + |ΔB|` over every pixel at full sample precision and
/// divides by `pixels × max_sample × 3`. Alpha is ignored; gray pixels are
/// expanded to RGB first, which leaves the normalization unchanged.
///
/// # Errors
///
/// Returns [`MosaicError::IncompatibleImages`] if the dimensions differ
pub fn manhattan_distance<A, B, P>(a: &A, b: &B) -> Result<f64>
where
    A: GenericImageView<Pixel = P>,
    B: GenericImageView<Pixel = P>,
    P: Pixel,
{
    if a.dimensions() != b.dimensions() {
        return Err(incompatible_images(&format!(
            "bounds are not identical: {:?} vs. {:?}",
            a.dimensions(),
            b.dimensions()
        )));
    }

    let (width, height) = a.dimensions();
    let pixel_count = u64::from(width) * u64::from(height);
    if pixel_count == 0 {
        return Ok(0.0);
    }

    let max_sample = <P::Subpixel as Primitive>::DEFAULT_MAX_VALUE
        .to_f64()
        .unwrap_or(1.0);

    let mut sum = 0.0;
    for y in 0..height {
        for x in 0..width {
            let left = a.get_pixel(x, y).to_rgb();
            let right = b.get_pixel(x, y).to_rgb();
            for (l, r) in left.0.iter().zip(right.0.iter()) {
                let l = l.to_f64().unwrap_or(0.0);
                let r = r.to_f64().unwrap_or(0.0);
                sum += (l - r).abs();
            }
        }
    }

    Ok(sum / (pixel_count as f64 * max_sample * 3.0))
}

/// Distance between two comparison proxies
///
/// Same value as [`manhattan_distance`] for this layout, accumulated in
/// integer arithmetic over the raw sample buffers.
///
/// # Errors
///
/// Returns [`MosaicError::IncompatibleImages`] if the dimensions differ
pub fn proxy_distance(a: &ProxyImage, b: &ProxyImage) -> Result<f64> {
    if a.dimensions() != b.dimensions() {
        return Err(incompatible_images(&format!(
            "bounds are not identical: {:?} vs. {:?}",
            a.dimensions(),
            b.dimensions()
        )));
    }

    let samples = a.as_raw().len();
    if samples == 0 {
        return Ok(0.0);
    }

    let sum: u64 = a
        .as_raw()
        .iter()
        .zip(b.as_raw().iter())
        .map(|(&l, &r)| u64::from(l.abs_diff(r)))
        .sum();

    Ok(sum as f64 / (samples as f64 * f64::from(u16::MAX)))
}

/// Distance between two decoded images of the same color model
///
/// # Errors
///
/// Returns an error if:
/// - The color models differ ([`MosaicError::IncompatibleImages`])
/// - The dimensions differ ([`MosaicError::IncompatibleImages`])
/// - The color model has no comparable layout ([`MosaicError::UnsupportedPixelFormat`])
pub fn compare_distance(a: &DynamicImage, b: &DynamicImage) -> Result<f64> {
    if a.color() != b.color() {
        return Err(incompatible_images(&format!(
            "different color models: {:?} vs. {:?}",
            a.color(),
            b.color()
        )));
    }

    match (a, b) {
        (DynamicImage::ImageLuma8(l), DynamicImage::ImageLuma8(r)) => manhattan_distance(l, r),
        (DynamicImage::ImageLumaA8(l), DynamicImage::ImageLumaA8(r)) => manhattan_distance(l, r),
        (DynamicImage::ImageRgb8(l), DynamicImage::ImageRgb8(r)) => manhattan_distance(l, r),
        (DynamicImage::ImageRgba8(l), DynamicImage::ImageRgba8(r)) => manhattan_distance(l, r),
        (DynamicImage::ImageLuma16(l), DynamicImage::ImageLuma16(r)) => manhattan_distance(l, r),
        (DynamicImage::ImageLumaA16(l), DynamicImage::ImageLumaA16(r)) => {
            manhattan_distance(l, r)
        }
        (DynamicImage::ImageRgb16(l), DynamicImage::ImageRgb16(r)) => proxy_distance(l, r),
        (DynamicImage::ImageRgba16(l), DynamicImage::ImageRgba16(r)) => manhattan_distance(l, r),
        (DynamicImage::ImageRgb32F(l), DynamicImage::ImageRgb32F(r)) => manhattan_distance(l, r),
        (DynamicImage::ImageRgba32F(l), DynamicImage::ImageRgba32F(r)) => {
            manhattan_distance(l, r)
        }
        _ => Err(MosaicError::UnsupportedPixelFormat { color: a.color() }),
    }
}

//! Loading, resizing, trimming, color statistics and codecs for tiles and master images

use crate::imaging::saliency::attention_offset;
use crate::io::configuration::MAX_OUTPUT_SIZE;
use crate::io::error::{MosaicError, Result, invalid_parameter};
use crate::spatial::Rect;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ExtendedColorType, ImageBuffer, ImageEncoder, ImageFormat, Rgb, RgbImage};
use std::path::Path;

/// Comparison layout: RGB with full 16-bit channel precision
pub type ProxyImage = ImageBuffer<Rgb<u16>, Vec<u16>>;

/// Strategy for bringing an image to an exact target size
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum CropMode {
    /// Scale to cover, then keep the window with the most visual interest
    #[default]
    Attention,
    /// Plain resample to the target size, ignoring aspect ratio
    Thumbnail,
    /// Scale to cover, then keep the centre window
    Centre,
}

/// Load an image file
///
/// # Errors
///
/// Returns [`MosaicError::ImageLoad`] if the file cannot be opened or decoded
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    image::open(path).map_err(|source| MosaicError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })
}

/// Convert to 8-bit sRGB, dropping alpha
pub fn to_srgb(image: &DynamicImage) -> RgbImage {
    image.to_rgb8()
}

/// Find the content rectangle inside a uniform frame
///
/// A pixel belongs to the frame when every channel is within `tolerance`
/// of `background`. Images without any frame-colored border, or made only
/// of frame color, return their full bounds.
pub fn auto_trim_border(image: &RgbImage, tolerance: u8, background: Rgb<u8>) -> Rect {
    let (width, height) = image.dimensions();
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0;
    let mut max_y = 0;
    let mut found_content = false;

    for (x, y, pixel) in image.enumerate_pixels() {
        let is_content = pixel
            .0
            .iter()
            .zip(background.0.iter())
            .any(|(&channel, &frame)| channel.abs_diff(frame) > tolerance);
        if is_content {
            found_content = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    if found_content {
        Rect::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1)
    } else {
        Rect::new(0, 0, width, height)
    }
}

/// Copy the part of `rect` that lies inside the image
///
/// Returns `None` when the rectangle does not overlap the image at all.
pub fn extract_region(image: &RgbImage, rect: Rect) -> Option<RgbImage> {
    let visible = rect.clip_to(image.width(), image.height())?;
    Some(
        imageops::crop_imm(image, visible.x, visible.y, visible.width, visible.height).to_image(),
    )
}

/// Bring an image to exactly `width`×`height` using the given crop strategy
pub fn resize_to_fit(image: &RgbImage, width: u32, height: u32, mode: CropMode) -> RgbImage {
    if image.dimensions() == (width, height) {
        return image.clone();
    }
    if image.width() == 0 || image.height() == 0 || width == 0 || height == 0 {
        return RgbImage::new(width, height);
    }

    match mode {
        CropMode::Thumbnail => imageops::thumbnail(image, width, height),
        CropMode::Centre => {
            let covered = scale_to_fill(image, width, height);
            let x = (covered.width() - width) / 2;
            let y = (covered.height() - height) / 2;
            imageops::crop_imm(&covered, x, y, width, height).to_image()
        }
        CropMode::Attention => {
            let covered = scale_to_fill(image, width, height);
            let (x, y) = attention_offset(&covered, width, height);
            imageops::crop_imm(&covered, x, y, width, height).to_image()
        }
    }
}

// Smallest aspect-preserving scale whose result covers the target box
fn scale_to_fill(image: &RgbImage, width: u32, height: u32) -> RgbImage {
    let scale = (f64::from(width) / f64::from(image.width()))
        .max(f64::from(height) / f64::from(image.height()));
    let scaled_width = ((f64::from(image.width()) * scale).ceil() as u32).max(width);
    let scaled_height = ((f64::from(image.height()) * scale).ceil() as u32).max(height);

    if (scaled_width, scaled_height) == image.dimensions() {
        image.clone()
    } else {
        imageops::resize(image, scaled_width, scaled_height, FilterType::Lanczos3)
    }
}

/// Scale the master image so its shorter side equals `size`
///
/// Returns an unmodified copy when the image already has that size.
///
/// # Errors
///
/// Returns [`MosaicError::InvalidParameter`] if the scaled longer side
/// would exceed [`MAX_OUTPUT_SIZE`]
pub fn scale_to_cover(image: &RgbImage, size: u32) -> Result<RgbImage> {
    if image.width() == 0 || image.height() == 0 {
        return Ok(image.clone());
    }

    let scale = (f64::from(size) / f64::from(image.width()))
        .max(f64::from(size) / f64::from(image.height()));
    let scaled_width = (f64::from(image.width()) * scale).round();
    let scaled_height = (f64::from(image.height()) * scale).round();
    let longer = scaled_width.max(scaled_height);
    if longer > f64::from(MAX_OUTPUT_SIZE) {
        return Err(invalid_parameter(
            "output_size",
            &size,
            &format!(
                "scales a {}x{} master to a {longer} pixel side, over the limit of {MAX_OUTPUT_SIZE}",
                image.width(),
                image.height()
            ),
        ));
    }
    let width = (scaled_width as u32).max(1);
    let height = (scaled_height as u32).max(1);

    if (width, height) == image.dimensions() {
        Ok(image.clone())
    } else {
        Ok(imageops::resize(image, width, height, FilterType::Lanczos3))
    }
}

/// Average over every RGB sample, on the 0–255 scale
pub fn mean_color(image: &RgbImage) -> f64 {
    let samples = image.as_raw();
    if samples.is_empty() {
        return 0.0;
    }
    let total: u64 = samples.iter().map(|&s| u64::from(s)).sum();
    total as f64 / samples.len() as f64
}

/// Widen an 8-bit image to the comparison layout
pub fn rgb_to_proxy(image: &RgbImage) -> ProxyImage {
    // 0xff * 0x101 == 0xffff keeps both ends of the range exact
    let samples = image.as_raw().iter().map(|&s| u16::from(s) * 257).collect();
    ProxyImage::from_raw(image.width(), image.height(), samples)
        .unwrap_or_else(|| ProxyImage::new(image.width(), image.height()))
}

/// Checked conversion of a decoded image to the comparison layout
///
/// # Errors
///
/// Returns [`MosaicError::UnsupportedPixelFormat`] for layouts without a
/// well-defined RGB interpretation
pub fn to_proxy(image: &DynamicImage) -> Result<ProxyImage> {
    match image {
        DynamicImage::ImageLuma8(_)
        | DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageRgb8(_)
        | DynamicImage::ImageRgba8(_)
        | DynamicImage::ImageLuma16(_)
        | DynamicImage::ImageLumaA16(_)
        | DynamicImage::ImageRgb16(_)
        | DynamicImage::ImageRgba16(_)
        | DynamicImage::ImageRgb32F(_)
        | DynamicImage::ImageRgba32F(_) => Ok(image.to_rgb16()),
        other => Err(MosaicError::UnsupportedPixelFormat {
            color: other.color(),
        }),
    }
}

/// Encode as baseline JPEG
///
/// # Errors
///
/// Returns [`MosaicError::Codec`] if the encoder rejects the image
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .encode_image(image)
        .map_err(|source| MosaicError::Codec {
            operation: "jpeg encode",
            source,
        })?;
    Ok(buffer)
}

/// Encode as PNG
///
/// # Errors
///
/// Returns [`MosaicError::Codec`] if the encoder rejects the image
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|source| MosaicError::Codec {
            operation: "png encode",
            source,
        })?;
    Ok(buffer)
}

/// Decode JPEG bytes
///
/// # Errors
///
/// Returns [`MosaicError::Codec`] if the bytes are not a valid JPEG stream
pub fn decode_jpeg(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory_with_format(bytes, ImageFormat::Jpeg).map_err(|source| {
        MosaicError::Codec {
            operation: "jpeg decode",
            source,
        }
    })
}

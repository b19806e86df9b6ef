//! Attention-weighted crop window selection
//!
//! Interest is estimated per pixel from luminance edge strength (Sobel) plus
//! a saturation term, the same cues a human eye is drawn to. The crop window
//! with the highest summed interest wins; a summed-area table keeps every
//! candidate window O(1) to score.

use image::RgbImage;

// Integer luminance approximation: Y ≈ (2R + 5G + B) / 8
const fn luminance(rgb: [u8; 3]) -> i32 {
    (rgb[0] as i32 * 2 + rgb[1] as i32 * 5 + rgb[2] as i32) >> 3
}

fn saturation(rgb: [u8; 3]) -> u32 {
    let max = rgb.iter().copied().max().unwrap_or(0);
    let min = rgb.iter().copied().min().unwrap_or(0);
    u32::from(max - min)
}

/// Per-pixel interest in row-major order
///
/// Border pixels carry only the saturation term since the Sobel kernel
/// needs a full neighbourhood.
pub fn interest_map(image: &RgbImage) -> Vec<u32> {
    let (width, height) = (image.width() as usize, image.height() as usize);
    let lum: Vec<i32> = image.pixels().map(|p| luminance(p.0)).collect();
    let mut interest: Vec<u32> = image.pixels().map(|p| saturation(p.0)).collect();

    if width < 3 || height < 3 {
        return interest;
    }

    let at = |x: usize, y: usize| lum.get(y * width + x).copied().unwrap_or(0);

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let p00 = at(x - 1, y - 1);
            let p01 = at(x, y - 1);
            let p02 = at(x + 1, y - 1);
            let p10 = at(x - 1, y);
            let p12 = at(x + 1, y);
            let p20 = at(x - 1, y + 1);
            let p21 = at(x, y + 1);
            let p22 = at(x + 1, y + 1);

            let gx = -p00 + p02 - 2 * p10 + 2 * p12 - p20 + p22;
            let gy = -p00 - 2 * p01 - p02 + p20 + 2 * p21 + p22;

            if let Some(value) = interest.get_mut(y * width + x) {
                *value += gx.unsigned_abs() + gy.unsigned_abs();
            }
        }
    }

    interest
}

// Summed-area table with a zero row and column in front
fn summed_area(values: &[u32], width: usize, height: usize) -> Vec<u64> {
    let stride = width + 1;
    let mut table = vec![0u64; stride * (height + 1)];

    for y in 0..height {
        let mut row_sum = 0u64;
        for x in 0..width {
            row_sum += u64::from(values.get(y * width + x).copied().unwrap_or(0));
            let above = table.get(y * stride + x + 1).copied().unwrap_or(0);
            if let Some(cell) = table.get_mut((y + 1) * stride + x + 1) {
                *cell = above + row_sum;
            }
        }
    }

    table
}

/// Top-left corner of the `width`×`height` window with the most interest
///
/// Ties keep the centred window, so featureless images crop like
/// [`crate::imaging::CropMode::Centre`]. Windows larger than the image
/// are anchored at the origin.
pub fn attention_offset(image: &RgbImage, width: u32, height: u32) -> (u32, u32) {
    let (image_width, image_height) = image.dimensions();
    if width >= image_width && height >= image_height {
        return (0, 0);
    }
    let span_x = image_width.saturating_sub(width);
    let span_y = image_height.saturating_sub(height);

    let (w, h) = (image_width as usize, image_height as usize);
    let table = summed_area(&interest_map(image), w, h);
    let stride = w + 1;
    let sum_at = |x: usize, y: usize| table.get(y * stride + x).copied().unwrap_or(0);
    let window_sum = |x: u32, y: u32| {
        let (x0, y0) = (x as usize, y as usize);
        let x1 = (x + width).min(image_width) as usize;
        let y1 = (y + height).min(image_height) as usize;
        (sum_at(x1, y1) + sum_at(x0, y0)) - (sum_at(x1, y0) + sum_at(x0, y1))
    };

    let mut best = (span_x / 2, span_y / 2);
    let mut best_sum = window_sum(best.0, best.1);

    for y in 0..=span_y {
        for x in 0..=span_x {
            let sum = window_sum(x, y);
            if sum > best_sum {
                best_sum = sum;
                best = (x, y);
            }
        }
    }

    best
}

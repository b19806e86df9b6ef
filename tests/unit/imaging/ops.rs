//! Tests for trimming, resizing, color statistics and codecs

#[cfg(test)]
mod tests {
    use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
    use std::path::Path;
    use tesselate::MosaicError;
    use tesselate::imaging::CropMode;
    use tesselate::imaging::ops::{
        auto_trim_border, decode_jpeg, encode_jpeg, encode_png, extract_region, load_image,
        mean_color, resize_to_fit, rgb_to_proxy, scale_to_cover, to_proxy,
    };
    use tesselate::spatial::Rect;

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    fn framed(width: u32, height: u32, content: Rect) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            let inside = x >= content.x && x < content.right() && y >= content.y && y < content.bottom();
            if inside { Rgb([200, 30, 30]) } else { WHITE }
        })
    }

    // Tests the trimmed rectangle is the tight bounding box of content
    // Verified by returning the bounds one pixel too large
    #[test]
    fn test_auto_trim_finds_content() {
        let content = Rect::new(3, 2, 4, 5);
        let image = framed(10, 10, content);
        assert_eq!(auto_trim_border(&image, 40, WHITE), content);
    }

    // Tests near-white pixels within tolerance are treated as frame
    // Verified by comparing with strict equality
    #[test]
    fn test_auto_trim_tolerance() {
        let mut image = framed(10, 10, Rect::new(4, 4, 2, 2));
        image.put_pixel(0, 0, Rgb([230, 230, 230]));
        assert_eq!(auto_trim_border(&image, 40, WHITE), Rect::new(4, 4, 2, 2));
        assert_eq!(auto_trim_border(&image, 10, WHITE), Rect::new(0, 0, 6, 6));
    }

    // Tests images without content keep their full bounds
    // Verified by returning an empty rectangle
    #[test]
    fn test_auto_trim_all_frame() {
        let image = RgbImage::from_pixel(6, 4, WHITE);
        assert_eq!(auto_trim_border(&image, 40, WHITE), Rect::new(0, 0, 6, 4));
    }

    // Tests region extraction clips to the image
    // Verified by extracting the unclipped rectangle
    #[test]
    fn test_extract_region_clips() {
        let image = RgbImage::from_fn(10, 10, |x, y| Rgb([x as u8, y as u8, 0]));
        let part = extract_region(&image, Rect::new(8, 6, 5, 5)).expect("overlaps");
        assert_eq!(part.dimensions(), (2, 4));
        assert_eq!(part.get_pixel(0, 0), &Rgb([8, 6, 0]));
        assert!(extract_region(&image, Rect::new(10, 0, 5, 5)).is_none());
    }

    // Tests every crop mode produces the exact target size
    // Verified by letting thumbnail preserve the aspect ratio
    #[test]
    fn test_resize_to_fit_dimensions() {
        let image = RgbImage::from_fn(40, 20, |x, _| Rgb([x as u8 * 5, 0, 0]));
        for mode in [CropMode::Attention, CropMode::Thumbnail, CropMode::Centre] {
            assert_eq!(resize_to_fit(&image, 10, 10, mode).dimensions(), (10, 10));
            assert_eq!(resize_to_fit(&image, 7, 13, mode).dimensions(), (7, 13));
        }
    }

    // Tests an image already at the target size is returned unchanged
    // Verified by always resampling
    #[test]
    fn test_resize_to_fit_identity() {
        let image = RgbImage::from_fn(12, 12, |x, y| Rgb([x as u8 * 9, y as u8 * 7, 3]));
        assert_eq!(resize_to_fit(&image, 12, 12, CropMode::Attention), image);
    }

    // Tests the centre crop keeps the middle of a wide image
    // Verified by anchoring the crop at the origin
    #[test]
    fn test_centre_crop_keeps_middle() {
        let image = RgbImage::from_fn(30, 10, |x, _| {
            if (10..20).contains(&x) { Rgb([0, 0, 255]) } else { Rgb([255, 0, 0]) }
        });
        let cropped = resize_to_fit(&image, 10, 10, CropMode::Centre);
        assert_eq!(cropped.get_pixel(5, 5), &Rgb([0, 0, 255]));
    }

    // Tests the shorter side is scaled to the requested size
    // Verified by scaling the longer side instead
    #[test]
    fn test_scale_to_cover() {
        let wide = RgbImage::new(100, 50);
        let scaled = |image: &RgbImage, size| {
            scale_to_cover(image, size)
                .expect("within the output limit")
                .dimensions()
        };
        assert_eq!(scaled(&wide, 200), (400, 200));
        let tall = RgbImage::new(30, 60);
        assert_eq!(scaled(&tall, 15), (15, 30));
        let square = RgbImage::new(20, 20);
        assert_eq!(scaled(&square, 20), (20, 20));
    }

    // Tests an extreme aspect ratio is refused before allocating
    // Verified by capping only the shorter side
    #[test]
    fn test_scale_to_cover_longer_side_limit() {
        let sliver = RgbImage::new(1, 1000);
        assert!(matches!(
            scale_to_cover(&sliver, 2000),
            Err(MosaicError::InvalidParameter {
                parameter: "output_size",
                ..
            })
        ));
        let strip = RgbImage::new(10, 1);
        assert_eq!(
            scale_to_cover(&strip, 10).map(|image| image.dimensions()).ok(),
            Some((100, 10))
        );
    }

    // Tests the mean averages every sample
    // Verified by averaging only the red channel
    #[test]
    fn test_mean_color() {
        let image = RgbImage::from_pixel(4, 4, Rgb([30, 60, 90]));
        assert!((mean_color(&image) - 60.0).abs() < 1e-12);
        assert!(mean_color(&RgbImage::new(0, 0)).abs() < f64::EPSILON);
    }

    // Tests widening to 16 bits keeps both ends of the range exact
    // Verified by shifting left by 8 instead of multiplying by 257
    #[test]
    fn test_rgb_to_proxy_range() {
        let image = RgbImage::from_fn(2, 1, |x, _| if x == 0 { Rgb([0; 3]) } else { Rgb([255; 3]) });
        let proxy = rgb_to_proxy(&image);
        assert_eq!(proxy.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(proxy.get_pixel(1, 0), &Rgb([65535, 65535, 65535]));
    }

    // Tests the checked conversion expands gray to RGB
    // Verified by rejecting gray images
    #[test]
    fn test_to_proxy_gray() {
        let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(3, 3, Luma([128])));
        let proxy = to_proxy(&gray).expect("gray converts");
        assert_eq!(proxy.dimensions(), (3, 3));
        assert_eq!(proxy.get_pixel(1, 1), &Rgb([128 * 257; 3]));
    }

    // Tests JPEG bytes decode back to the same dimensions
    // Verified by encoding with swapped width and height
    #[test]
    fn test_jpeg_codec() {
        let image = RgbImage::from_fn(16, 8, |x, y| Rgb([x as u8 * 10, y as u8 * 20, 50]));
        let bytes = encode_jpeg(&image, 90).expect("encodes");
        let decoded = decode_jpeg(&bytes).expect("decodes");
        assert_eq!(decoded.width(), 16);
        assert_eq!(decoded.height(), 8);
        assert!(matches!(
            decode_jpeg(b"not a jpeg"),
            Err(MosaicError::Codec { .. })
        ));
    }

    // Tests PNG output carries the PNG signature
    // Verified by encoding as JPEG
    #[test]
    fn test_png_codec() {
        let bytes = encode_png(&RgbImage::new(3, 3)).expect("encodes");
        assert_eq!(bytes.get(..8), Some(&b"\x89PNG\r\n\x1a\n"[..]));
    }

    // Tests a missing file reports its path
    // Verified by mapping load failures to a codec error
    #[test]
    fn test_load_missing_image() {
        let path = Path::new("definitely/not/here.png");
        match load_image(path) {
            Err(MosaicError::ImageLoad { path: failed, .. }) => assert_eq!(failed, path),
            other => unreachable!("expected ImageLoad, got {other:?}"),
        }
    }
}

//! Tests for mosaic export

#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;
    use tesselate::io::error::MosaicError;
    use tesselate::io::image::save_mosaic;

    fn sample() -> RgbImage {
        RgbImage::from_fn(12, 8, |x, y| Rgb([x as u8 * 20, y as u8 * 30, 77]))
    }

    // Tests PNG output is lossless and creates missing directories
    // Verified by skipping parent directory creation
    #[test]
    fn test_save_png_creates_directories() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let path = temp.path().join("nested/deeper/mosaic.png");

        save_mosaic(&sample(), &path, 85).expect("save succeeds");

        let reloaded = image::open(&path).expect("reload").to_rgb8();
        assert_eq!(reloaded, sample());
    }

    // Tests JPEG output is written regardless of extension case
    // Verified by matching only lowercase extensions
    #[test]
    fn test_save_jpeg() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        for name in ["mosaic.jpg", "mosaic.JPEG"] {
            let path = temp.path().join(name);
            save_mosaic(&sample(), &path, 85).expect("save succeeds");
            let bytes = std::fs::read(&path).expect("written");
            assert_eq!(bytes.get(..2), Some(&[0xFF, 0xD8][..]));
        }
    }

    // Tests an unknown extension is an export error
    // Verified by defaulting unknown extensions to PNG
    #[test]
    fn test_unknown_extension() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let path = temp.path().join("mosaic.nope");
        assert!(matches!(
            save_mosaic(&sample(), &path, 85),
            Err(MosaicError::ImageExport { .. })
        ));
    }
}

//! Mosaic export to JPEG or any other format `image` can infer from the path

use crate::imaging::ops::encode_jpeg;
use crate::io::error::{MosaicError, Result};
use image::RgbImage;
use std::path::Path;

fn is_jpeg(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"))
}

/// Write the finished mosaic to `output_path`
///
/// JPEG output uses `quality`; other extensions are encoded with the
/// format's defaults.
///
/// # Errors
///
/// Returns an error if:
/// - The parent directory cannot be created
/// - The image cannot be encoded for the requested format
/// - The file cannot be written
pub fn save_mosaic(image: &RgbImage, output_path: &Path, quality: u8) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| MosaicError::FileSystem {
                path: parent.to_path_buf(),
                operation: "create directory",
                source: e,
            })?;
        }
    }

    if is_jpeg(output_path) {
        let bytes = encode_jpeg(image, quality)?;
        std::fs::write(output_path, bytes).map_err(|e| MosaicError::FileSystem {
            path: output_path.to_path_buf(),
            operation: "write mosaic",
            source: e,
        })?;
    } else {
        image.save(output_path).map_err(|e| MosaicError::ImageExport {
            path: output_path.to_path_buf(),
            source: e,
        })?;
    }

    log::info!("Saved mosaic to {}", output_path.display());
    Ok(())
}

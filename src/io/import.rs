//! Pre-rendering of tiles into a cache directory

use crate::imaging::CropMode;
use crate::imaging::ops::{encode_jpeg, load_image, mean_color, resize_to_fit};
use crate::io::configuration::CACHE_JPEG_QUALITY;
use crate::io::error::{MosaicError, Result, TileContext, invalid_parameter};
use crate::io::progress::BuildProgress;
use crate::io::store::{CacheKey, GlobStore, TilePreparation, check_label, prepare_tile_image};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Counters of one import run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Files written to the cache
    pub imported: usize,
    /// Files that could not be imported
    pub failed: usize,
    /// Wall time of the run
    pub elapsed: Duration,
}

/// Renders source images into `<label>_<size>_<mean>_<name>` cache entries
pub struct CacheImporter {
    cache_dir: PathBuf,
    label: String,
    tile_size: u32,
    preparation: TilePreparation,
    pool: ThreadPool,
}

impl CacheImporter {
    /// Prepare an import of `tile_size` renderings into `cache_dir`
    ///
    /// The directory is created if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The label is empty or contains the key separator
    /// - `tile_size` or `workers` is zero
    /// - The cache directory cannot be created
    /// - The worker pool cannot be started
    pub fn new(cache_dir: &Path, label: &str, tile_size: u32, workers: usize) -> Result<Self> {
        check_label(label)?;
        if tile_size == 0 {
            return Err(invalid_parameter("tile_size", &tile_size, &"must be positive"));
        }
        if workers == 0 {
            return Err(invalid_parameter("workers", &workers, &"must be positive"));
        }

        fs::create_dir_all(cache_dir).map_err(|source| MosaicError::FileSystem {
            path: cache_dir.to_path_buf(),
            operation: "create cache directory",
            source,
        })?;

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("tesselate-import-{index}"))
            .build()
            .map_err(|source| MosaicError::WorkerPool { workers, source })?;

        Ok(Self {
            cache_dir: cache_dir.to_path_buf(),
            label: label.to_string(),
            tile_size,
            preparation: TilePreparation {
                crop: CropMode::Centre,
                ..TilePreparation::default()
            },
            pool,
        })
    }

    /// Render one source file and return the path of its cache entry
    ///
    /// The entry is named after the source's full file name. Earlier
    /// renderings of that name at this size are replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be decoded, encoded or written,
    /// or if a stale entry cannot be removed
    pub fn import_file(&self, source: &Path) -> Result<PathBuf> {
        let image = load_image(source)?;
        let prepared = prepare_tile_image(&image, &self.preparation);
        let tile = resize_to_fit(
            &prepared,
            self.tile_size,
            self.tile_size,
            self.preparation.crop,
        );
        let bytes = encode_jpeg(&tile, CACHE_JPEG_QUALITY)?;

        let name = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| invalid_parameter("source", &source.display(), &"has no file name"))?;
        let key = CacheKey {
            label: self.label.clone(),
            size: self.tile_size,
            mean: mean_color(&tile) as u32,
            name,
        };

        self.remove_stale(&key)?;
        let path = self.cache_dir.join(key.file_name());
        fs::write(&path, bytes).map_err(|e| MosaicError::FileSystem {
            path: path.clone(),
            operation: "write cache entry",
            source: e,
        })?;
        Ok(path)
    }

    // Entries of the same source and size left by an earlier import
    fn remove_stale(&self, key: &CacheKey) -> Result<()> {
        let listing = fs::read_dir(&self.cache_dir).map_err(|source| MosaicError::FileSystem {
            path: self.cache_dir.clone(),
            operation: "read cache directory",
            source,
        })?;

        for entry in listing.filter_map(std::result::Result::ok) {
            let Some(existing) = CacheKey::parse(&entry.file_name().to_string_lossy()) else {
                continue;
            };
            if existing != *key && existing.is_rendering_of(key, key.size) {
                let path = entry.path();
                log::debug!("Replacing stale cache entry {}", path.display());
                match fs::remove_file(&path) {
                    Ok(()) => {}
                    // Already replaced by a concurrent import of the same name
                    Err(source) if source.kind() == std::io::ErrorKind::NotFound => {}
                    Err(source) => {
                        return Err(MosaicError::FileSystem {
                            path,
                            operation: "remove stale cache entry",
                            source,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Import every file matching `pattern`
    ///
    /// Per-file failures are logged and counted.
    ///
    /// # Errors
    ///
    /// Returns [`MosaicError::Pattern`] if the pattern is malformed
    pub fn run(&self, pattern: &str, progress: &dyn BuildProgress) -> Result<ImportSummary> {
        let started = Instant::now();
        let paths = GlobStore::new(pattern, self.preparation)?.paths()?;
        let imported = AtomicUsize::new(0);
        let failed = AtomicUsize::new(0);

        log::info!(
            "Importing {} files at size {} into {}",
            paths.len(),
            self.tile_size,
            self.cache_dir.display()
        );
        progress.start("Importing", paths.len());

        self.pool.install(|| {
            paths.par_iter().for_each(|path| {
                let result = self
                    .import_file(path)
                    .loading_tile(&path.to_string_lossy());
                match result {
                    Ok(entry) => {
                        imported.fetch_add(1, Ordering::Relaxed);
                        log::debug!("Wrote {}", entry.display());
                    }
                    Err(error) => {
                        failed.fetch_add(1, Ordering::Relaxed);
                        log::warn!("{error}");
                    }
                }
                progress.advance();
            });
        });
        progress.finish();

        let summary = ImportSummary {
            imported: imported.into_inner(),
            failed: failed.into_inner(),
            elapsed: started.elapsed(),
        };
        log::info!(
            "Imported {} files ({} failed) in {:.2?}",
            summary.imported,
            summary.failed,
            summary.elapsed
        );
        Ok(summary)
    }
}

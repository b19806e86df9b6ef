//! Tile sources: glob-matched image files and a pre-rendered JPEG cache
//!
//! The engine only sees two seams. A [`TileResolver`] produces the
//! full-resolution tile that gets composited, and a [`TileStore`]
//! additionally enumerates the corpus and loads comparison proxies.

use crate::imaging::ops::{
    auto_trim_border, decode_jpeg, extract_region, load_image, mean_color, resize_to_fit,
    rgb_to_proxy, to_proxy, to_srgb,
};
use crate::imaging::CropMode;
use crate::io::configuration::{CACHE_KEY_SEPARATOR, TRIM_BACKGROUND, TRIM_TOLERANCE};
use crate::io::error::{MosaicError, Result, TileContext, invalid_parameter};
use crate::io::progress::BuildProgress;
use crate::spatial::{Tile, TileCorpus, TileId};
use image::{DynamicImage, Rgb, RgbImage};
use rayon::prelude::*;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Produces the full-resolution form of a tile
pub trait TileResolver: Sync {
    /// Render tile `identity` as a `size`×`size` image
    ///
    /// # Errors
    ///
    /// Returns an error if the tile cannot be found, read or decoded
    fn resolve(&self, identity: &TileId, size: u32) -> Result<RgbImage>;
}

/// A tile source that can also populate a corpus
pub trait TileStore: TileResolver {
    /// Every tile available at the given comparison size, in a stable order
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying source cannot be listed
    fn identities(&self, compare_size: u32) -> Result<Vec<TileId>>;

    /// Load the comparison proxy and mean color of one tile
    ///
    /// # Errors
    ///
    /// Returns an error if the tile cannot be read, decoded or converted
    fn load_tile(&self, identity: &TileId, compare_size: u32) -> Result<Tile>;
}

/// How raw tile images are cleaned up before use
#[derive(Clone, Copy, Debug)]
pub struct TilePreparation {
    /// Crop strategy when bringing a tile to its square target size
    pub crop: CropMode,
    /// Per-channel tolerance of the trimmed frame
    pub trim_tolerance: u8,
    /// Frame color to trim
    pub trim_background: Rgb<u8>,
}

impl Default for TilePreparation {
    fn default() -> Self {
        Self {
            crop: CropMode::default(),
            trim_tolerance: TRIM_TOLERANCE,
            trim_background: Rgb(TRIM_BACKGROUND),
        }
    }
}

/// Convert to sRGB and cut away a uniform frame
pub fn prepare_tile_image(image: &DynamicImage, preparation: &TilePreparation) -> RgbImage {
    let rgb = to_srgb(image);
    let content = auto_trim_border(&rgb, preparation.trim_tolerance, preparation.trim_background);
    if content.x == 0
        && content.y == 0
        && (content.width, content.height) == rgb.dimensions()
    {
        return rgb;
    }
    extract_region(&rgb, content).unwrap_or(rgb)
}

/// Tiles read straight from image files matched by a glob pattern
#[derive(Clone, Debug)]
pub struct GlobStore {
    pattern: String,
    preparation: TilePreparation,
}

impl GlobStore {
    /// Create a store over every file matching `pattern`
    ///
    /// # Errors
    ///
    /// Returns [`MosaicError::Pattern`] if the pattern is malformed
    pub fn new(pattern: &str, preparation: TilePreparation) -> Result<Self> {
        glob::Pattern::new(pattern).map_err(|source| MosaicError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            pattern: pattern.to_string(),
            preparation,
        })
    }

    /// The glob pattern
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Sorted regular files matching the pattern
    ///
    /// # Errors
    ///
    /// Returns [`MosaicError::Pattern`] if the pattern is malformed
    pub fn paths(&self) -> Result<Vec<PathBuf>> {
        let entries = glob::glob(&self.pattern).map_err(|source| MosaicError::Pattern {
            pattern: self.pattern.clone(),
            source,
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(error) => {
                    log::warn!("Skipping unreadable match: {error}");
                    None
                }
            })
            .filter(|path| path.is_file())
            .collect();
        paths.sort();
        Ok(paths)
    }

    fn load_prepared(&self, identity: &TileId) -> Result<RgbImage> {
        let image = load_image(Path::new(identity.as_str()))?;
        Ok(prepare_tile_image(&image, &self.preparation))
    }
}

impl TileResolver for GlobStore {
    fn resolve(&self, identity: &TileId, size: u32) -> Result<RgbImage> {
        let prepared = self.load_prepared(identity)?;
        Ok(resize_to_fit(&prepared, size, size, self.preparation.crop))
    }
}

impl TileStore for GlobStore {
    fn identities(&self, _compare_size: u32) -> Result<Vec<TileId>> {
        Ok(self
            .paths()?
            .into_iter()
            .map(|path| TileId::new(path.to_string_lossy().into_owned()))
            .collect())
    }

    fn load_tile(&self, identity: &TileId, compare_size: u32) -> Result<Tile> {
        let prepared = self.load_prepared(identity)?;
        let mean = mean_color(&prepared);
        let small = resize_to_fit(&prepared, compare_size, compare_size, self.preparation.crop);
        Ok(Tile::new(identity.clone(), rgb_to_proxy(&small), mean))
    }
}

/// File name of a pre-rendered tile: `<label>_<size>_<mean>_<name>`
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    /// Cache namespace
    pub label: String,
    /// Edge length of the stored rendering
    pub size: u32,
    /// Mean color of the stored rendering, truncated
    pub mean: u32,
    /// Source file name; may itself contain separators
    pub name: String,
}

impl CacheKey {
    /// Split a file name into its key components
    ///
    /// Returns `None` for names that are not cache keys.
    pub fn parse(file_name: &str) -> Option<Self> {
        let mut parts = file_name.splitn(4, CACHE_KEY_SEPARATOR);
        let label = parts.next()?;
        let size = parts.next()?.parse().ok()?;
        let mean = parts.next()?.parse().ok()?;
        let name = parts.next()?;
        if label.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self {
            label: label.to_string(),
            size,
            mean,
            name: name.to_string(),
        })
    }

    /// File name under which the entry is stored
    pub fn file_name(&self) -> String {
        self.to_string()
    }

    /// Test whether this entry is the same source at another size
    pub fn is_rendering_of(&self, other: &Self, size: u32) -> bool {
        self.size == size && self.label == other.label && self.name == other.name
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = CACHE_KEY_SEPARATOR;
        write!(
            f,
            "{}{sep}{}{sep}{}{sep}{}",
            self.label, self.size, self.mean, self.name
        )
    }
}

/// Validate a cache label
///
/// # Errors
///
/// Returns an error if the label is empty or contains the key separator
pub fn check_label(label: &str) -> Result<()> {
    if label.is_empty() {
        return Err(invalid_parameter("label", &label, &"must not be empty"));
    }
    if label.contains(CACHE_KEY_SEPARATOR) {
        return Err(invalid_parameter(
            "label",
            &label,
            &format!("must not contain '{CACHE_KEY_SEPARATOR}'"),
        ));
    }
    Ok(())
}

/// Tiles pre-rendered into a directory by the cache importer
///
/// The directory is indexed once when the store is opened.
#[derive(Clone, Debug)]
pub struct CacheStore {
    dir: PathBuf,
    label: String,
    entries: Vec<CacheKey>,
}

impl CacheStore {
    /// Open the cache in `dir` and index the entries carrying `label`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The label is empty or contains the key separator
    /// - The directory cannot be read
    pub fn new(dir: &Path, label: &str) -> Result<Self> {
        check_label(label)?;

        let listing = fs::read_dir(dir).map_err(|source| MosaicError::FileSystem {
            path: dir.to_path_buf(),
            operation: "read cache directory",
            source,
        })?;

        let mut entries: Vec<CacheKey> = listing
            .filter_map(std::result::Result::ok)
            .filter_map(|entry| CacheKey::parse(&entry.file_name().to_string_lossy()))
            .filter(|key| key.label == label)
            .collect();
        entries.sort();

        log::debug!(
            "Indexed {} cache entries labelled '{label}' in {}",
            entries.len(),
            dir.display()
        );

        Ok(Self {
            dir: dir.to_path_buf(),
            label: label.to_string(),
            entries,
        })
    }

    /// The cache label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of indexed entries across all sizes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries carry this label
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn key_of(identity: &TileId) -> Result<CacheKey> {
        CacheKey::parse(identity.as_str()).ok_or_else(|| {
            invalid_parameter("identity", &identity, &"is not a cache key")
        })
    }

    fn read_entry(&self, key: &CacheKey) -> Result<DynamicImage> {
        let path = self.dir.join(key.file_name());
        let bytes = fs::read(&path).map_err(|source| MosaicError::FileSystem {
            path,
            operation: "read cache entry",
            source,
        })?;
        decode_jpeg(&bytes)
    }
}

impl TileResolver for CacheStore {
    fn resolve(&self, identity: &TileId, size: u32) -> Result<RgbImage> {
        let wanted = Self::key_of(identity)?;
        let key = self
            .entries
            .iter()
            .find(|key| key.is_rendering_of(&wanted, size))
            .ok_or_else(|| MosaicError::MissingTile {
                identity: identity.to_string(),
                size,
            })?;
        Ok(to_srgb(&self.read_entry(key)?))
    }
}

impl TileStore for CacheStore {
    fn identities(&self, compare_size: u32) -> Result<Vec<TileId>> {
        Ok(self
            .entries
            .iter()
            .filter(|key| key.size == compare_size)
            .map(|key| TileId::new(key.file_name()))
            .collect())
    }

    fn load_tile(&self, identity: &TileId, compare_size: u32) -> Result<Tile> {
        let key = Self::key_of(identity)?;
        if key.size != compare_size {
            return Err(MosaicError::MissingTile {
                identity: identity.to_string(),
                size: compare_size,
            });
        }
        let proxy = to_proxy(&self.read_entry(&key)?)?;
        Ok(Tile::new(identity.clone(), proxy, f64::from(key.mean)))
    }
}

/// Load every tile of `store` into a fresh corpus
///
/// Tiles are loaded in parallel but inserted in identity order. A tile that
/// fails to load is logged and left out.
///
/// # Errors
///
/// Returns an error if the store cannot enumerate its tiles
pub fn populate_corpus<S: TileStore + ?Sized>(
    store: &S,
    compare_size: u32,
    progress: &dyn BuildProgress,
) -> Result<TileCorpus> {
    let started = Instant::now();
    let identities = store.identities(compare_size)?;
    progress.start("Loading", identities.len());

    let loaded: Vec<Result<Tile>> = identities
        .par_iter()
        .map(|identity| {
            let tile = store
                .load_tile(identity, compare_size)
                .loading_tile(identity.as_str());
            progress.advance();
            tile
        })
        .collect();
    progress.finish();

    let mut corpus = TileCorpus::new();
    let mut failed = 0;
    for tile in loaded {
        match tile {
            Ok(tile) => {
                corpus.push(tile);
            }
            Err(error) => {
                failed += 1;
                log::warn!("{error}");
            }
        }
    }

    log::info!(
        "Loaded {} tiles ({failed} failed) in {:.2?}",
        corpus.len(),
        started.elapsed()
    );
    Ok(corpus)
}

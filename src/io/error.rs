//! Error types and context management for mosaic construction

use std::fmt;
use std::path::PathBuf;

/// Main error type for all mosaic operations
#[derive(Debug)]
pub enum MosaicError {
    /// Failed to load an image from the filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// Configuration or argument validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Tile glob pattern could not be parsed
    Pattern {
        /// The offending pattern
        pattern: String,
        /// Underlying pattern error
        source: glob::PatternError,
    },

    /// A single tile could not be loaded into the corpus
    TileLoad {
        /// Identity of the tile
        identity: String,
        /// What went wrong while loading it
        source: Box<Self>,
    },

    /// Two images cannot be compared with each other
    ///
    /// Raised when color models or dimensions differ.
    IncompatibleImages {
        /// Description of the mismatch
        reason: String,
    },

    /// Decoded image uses a pixel layout the comparison pipeline cannot represent
    UnsupportedPixelFormat {
        /// Color type of the rejected image
        color: image::ColorType,
    },

    /// The full-resolution form of a winning tile could not be produced
    Resolution {
        /// Identity of the tile
        identity: String,
        /// What went wrong while resolving it
        source: Box<Self>,
    },

    /// No stored rendering exists for a tile at the requested size
    MissingTile {
        /// Identity of the tile
        identity: String,
        /// Requested edge length in pixels
        size: u32,
    },

    /// A corpus handle was removed more than once
    TileAlreadyRemoved {
        /// Arena index of the handle
        index: usize,
    },

    /// A corpus handle does not refer to any inserted tile
    UnknownTile {
        /// Arena index of the handle
        index: usize,
        /// Number of tiles ever inserted into the corpus
        capacity: usize,
    },

    /// Build was cancelled between regions
    Cancelled {
        /// Regions fully processed before the cancellation was observed
        regions_completed: usize,
    },

    /// In-memory encoding or decoding failed
    Codec {
        /// Name of the codec operation
        operation: &'static str,
        /// Underlying image error
        source: image::ImageError,
    },

    /// Failed to save the generated image to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The matching worker pool could not be started
    WorkerPool {
        /// Requested number of worker threads
        workers: usize,
        /// Underlying thread pool error
        source: rayon::ThreadPoolBuildError,
    },

    /// The global logger could not be installed
    LoggerInit {
        /// Underlying logger error
        source: log::SetLoggerError,
    },
}

impl fmt::Display for MosaicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::Pattern { pattern, source } => {
                write!(f, "Invalid tile pattern '{pattern}': {source}")
            }
            Self::TileLoad { identity, source } => {
                write!(f, "Failed to load tile '{identity}': {source}")
            }
            Self::IncompatibleImages { reason } => {
                write!(f, "Images cannot be compared: {reason}")
            }
            Self::UnsupportedPixelFormat { color } => {
                write!(f, "Unsupported pixel format {color:?}")
            }
            Self::Resolution { identity, source } => {
                write!(f, "Failed to resolve tile '{identity}': {source}")
            }
            Self::MissingTile { identity, size } => {
                write!(f, "No rendering of tile '{identity}' at size {size}")
            }
            Self::TileAlreadyRemoved { index } => {
                write!(f, "Tile handle {index} was already removed from the corpus")
            }
            Self::UnknownTile { index, capacity } => {
                write!(
                    f,
                    "Tile handle {index} is out of bounds (corpus holds {capacity})"
                )
            }
            Self::Cancelled { regions_completed } => {
                write!(f, "Build cancelled after {regions_completed} regions")
            }
            Self::Codec { operation, source } => {
                write!(f, "Codec error during {operation}: {source}")
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::WorkerPool { workers, source } => {
                write!(f, "Failed to start {workers} matching workers: {source}")
            }
            Self::LoggerInit { source } => {
                write!(f, "Failed to initialise logging: {source}")
            }
        }
    }
}

impl std::error::Error for MosaicError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. }
            | Self::ImageExport { source, .. }
            | Self::Codec { source, .. } => Some(source),
            Self::Pattern { source, .. } => Some(source),
            Self::TileLoad { source, .. } | Self::Resolution { source, .. } => {
                Some(source.as_ref())
            }
            Self::FileSystem { source, .. } => Some(source),
            Self::WorkerPool { source, .. } => Some(source),
            Self::LoggerInit { source } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for mosaic results
pub type Result<T> = std::result::Result<T, MosaicError>;

/// Attaches a tile identity to errors raised while handling that tile
pub trait TileContext<T> {
    /// Wrap an error raised while loading the tile's comparison proxy
    ///
    /// # Errors
    ///
    /// Propagates the original error as [`MosaicError::TileLoad`]
    fn loading_tile(self, identity: &str) -> Result<T>;

    /// Wrap an error raised while producing the tile's full-resolution form
    ///
    /// # Errors
    ///
    /// Propagates the original error as [`MosaicError::Resolution`]
    fn resolving_tile(self, identity: &str) -> Result<T>;
}

impl<T, E> TileContext<T> for std::result::Result<T, E>
where
    E: Into<MosaicError>,
{
    fn loading_tile(self, identity: &str) -> Result<T> {
        self.map_err(|e| match e.into() {
            // Already attributed to a tile
            error @ MosaicError::TileLoad { .. } => error,
            error => MosaicError::TileLoad {
                identity: identity.to_string(),
                source: Box::new(error),
            },
        })
    }

    fn resolving_tile(self, identity: &str) -> Result<T> {
        self.map_err(|e| match e.into() {
            error @ MosaicError::Resolution { .. } => error,
            error => MosaicError::Resolution {
                identity: identity.to_string(),
                source: Box::new(error),
            },
        })
    }
}

impl From<image::ImageError> for MosaicError {
    fn from(err: image::ImageError) -> Self {
        Self::Codec {
            operation: "unknown",
            source: err,
        }
    }
}

impl From<std::io::Error> for MosaicError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> MosaicError {
    MosaicError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create an incompatible images error
pub fn incompatible_images(reason: &impl ToString) -> MosaicError {
    MosaicError::IncompatibleImages {
        reason: reason.to_string(),
    }
}

//! Tile records: identity, comparison thumbnail and mean color

use crate::imaging::ProxyImage;
use std::fmt;

/// Opaque tile identity, a path or a cache key
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(String);

impl TileId {
    /// Wrap an identity string
    pub fn new(identity: impl Into<String>) -> Self {
        Self(identity.into())
    }

    /// Borrow the identity string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TileId {
    fn from(identity: &str) -> Self {
        Self::new(identity)
    }
}

impl From<String> for TileId {
    fn from(identity: String) -> Self {
        Self(identity)
    }
}

/// Immutable candidate tile
///
/// The thumbnail is optional so that a corpus entry whose pixel data went
/// missing can still be carried and skipped during matching.
#[derive(Clone, Debug)]
pub struct Tile {
    identity: TileId,
    thumbnail: Option<ProxyImage>,
    mean: f64,
}

impl Tile {
    /// Create a tile with comparison pixels
    pub const fn new(identity: TileId, thumbnail: ProxyImage, mean: f64) -> Self {
        Self {
            identity,
            thumbnail: Some(thumbnail),
            mean,
        }
    }

    /// Create a tile whose thumbnail is unavailable
    pub const fn without_thumbnail(identity: TileId, mean: f64) -> Self {
        Self {
            identity,
            thumbnail: None,
            mean,
        }
    }

    /// Identity used to resolve the full-resolution form
    pub const fn identity(&self) -> &TileId {
        &self.identity
    }

    /// Comparison pixels, if loaded
    pub const fn thumbnail(&self) -> Option<&ProxyImage> {
        self.thumbnail.as_ref()
    }

    /// Mean color on the 0–255 scale
    pub const fn mean(&self) -> f64 {
        self.mean
    }
}

use crate::io::error::{MosaicError, Result};
use crate::spatial::tiles::Tile;
use bitvec::prelude::*;
use std::fmt;

/// Stable reference to a tile in a [`TileCorpus`]
///
/// Handles are arena indices; they stay valid after other tiles are removed
/// and are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileHandle(usize);

impl TileHandle {
    /// Arena index of the handle
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Ordered arena of tiles with a live/removed bitset
///
/// Scans visit live tiles in insertion order. Removal only flips the live
/// bit, so it is O(1) and never shifts other handles.
#[derive(Clone, Debug, Default)]
pub struct TileCorpus {
    tiles: Vec<Tile>,
    live: BitVec,
    live_count: usize,
}

impl TileCorpus {
    /// Create an empty corpus
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tile and return its handle
    pub fn push(&mut self, tile: Tile) -> TileHandle {
        let handle = TileHandle(self.tiles.len());
        self.tiles.push(tile);
        self.live.push(true);
        self.live_count += 1;
        handle
    }

    /// Retire a tile so no later scan visits it
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The handle was never issued by this corpus
    /// - The tile was already removed
    pub fn remove(&mut self, handle: TileHandle) -> Result<()> {
        if handle.0 >= self.tiles.len() {
            return Err(MosaicError::UnknownTile {
                index: handle.0,
                capacity: self.tiles.len(),
            });
        }
        if !self.is_live(handle) {
            return Err(MosaicError::TileAlreadyRemoved { index: handle.0 });
        }

        self.live.set(handle.0, false);
        self.live_count -= 1;
        Ok(())
    }

    /// Test whether a handle refers to a live tile
    pub fn is_live(&self, handle: TileHandle) -> bool {
        self.live.get(handle.0).as_deref() == Some(&true)
    }

    /// Look up a live tile
    pub fn get(&self, handle: TileHandle) -> Option<&Tile> {
        if self.is_live(handle) {
            self.tiles.get(handle.0)
        } else {
            None
        }
    }

    /// Number of live tiles
    pub const fn len(&self) -> usize {
        self.live_count
    }

    /// Test if no live tiles remain
    pub const fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    /// Number of tiles ever inserted, live or removed
    pub fn capacity(&self) -> usize {
        self.tiles.len()
    }

    /// Iterate live tiles in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (TileHandle, &Tile)> + '_ {
        self.live
            .iter_ones()
            .filter_map(|index| self.tiles.get(index).map(|tile| (TileHandle(index), tile)))
    }
}

impl FromIterator<Tile> for TileCorpus {
    fn from_iter<I: IntoIterator<Item = Tile>>(iter: I) -> Self {
        let mut corpus = Self::new();
        for tile in iter {
            corpus.push(tile);
        }
        corpus
    }
}

impl fmt::Display for TileCorpus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TileCorpus({} live of {} tiles)",
            self.live_count,
            self.tiles.len()
        )
    }
}

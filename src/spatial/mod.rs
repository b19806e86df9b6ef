//! Region planning and tile corpus bookkeeping
//!
//! This module contains spatial-related functionality including:
//! - Grid partitioning of the canvas and region proxies
//! - Tile records and their identities
//! - The tile corpus arena with removal-by-handle

/// Arena of candidate tiles with stable handles
pub mod corpus;
/// Canvas partitioning and randomized visitation order
pub mod regions;
/// Tile records and identities
pub mod tiles;

pub use corpus::{TileCorpus, TileHandle};
pub use regions::{Rect, Region, RegionCell, RegionPlanner};
pub use tiles::{Tile, TileId};

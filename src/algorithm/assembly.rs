//! Uniqueness policy, tile resolution and compositing into the canvas

use crate::algorithm::reducer::BestMatch;
use crate::io::error::TileContext;
use crate::io::store::TileResolver;
use crate::spatial::{RegionCell, TileCorpus, TileId};
use image::RgbImage;
use image::imageops;

/// What happened to one region
#[derive(Clone, Debug, PartialEq)]
pub enum Placement {
    /// The winner was drawn into the canvas
    Composited {
        /// Identity of the drawn tile
        identity: TileId,
        /// Distance of the winner to the region proxy
        distance: f64,
    },
    /// No candidate qualified; the canvas was left untouched
    NoWinner,
    /// The winner's full-resolution form could not be produced
    ResolutionFailed {
        /// Identity of the winner
        identity: TileId,
    },
    /// The cell lies entirely outside the canvas
    OutsideCanvas,
}

impl Placement {
    /// Whether the region received a tile
    pub const fn is_composited(&self) -> bool {
        matches!(self, Self::Composited { .. })
    }
}

/// Owns the output canvas and draws winners into it
#[derive(Clone, Debug)]
pub struct Assembler {
    canvas: RgbImage,
    unique: bool,
    tile_size: u32,
}

impl Assembler {
    /// Start from a canvas holding the scaled master image
    pub const fn new(canvas: RgbImage, unique: bool, tile_size: u32) -> Self {
        Self {
            canvas,
            unique,
            tile_size,
        }
    }

    /// Current canvas contents
    pub const fn canvas(&self) -> &RgbImage {
        &self.canvas
    }

    /// Release the finished canvas
    pub fn into_canvas(self) -> RgbImage {
        self.canvas
    }

    /// Apply the winner of `cell` to the corpus and the canvas
    ///
    /// With uniqueness on the winner is retired before it is resolved, so a
    /// tile that fails to resolve is never offered again either. Failures
    /// are logged and reported in the returned placement.
    pub fn assemble<R: TileResolver + ?Sized>(
        &mut self,
        cell: &RegionCell,
        winner: Option<&BestMatch>,
        corpus: &mut TileCorpus,
        resolver: &R,
    ) -> Placement {
        let Some(winner) = winner else {
            log::warn!(
                "No tile within range for region ({}, {})",
                cell.column,
                cell.row
            );
            return Placement::NoWinner;
        };

        if self.unique {
            if let Err(error) = corpus.remove(winner.handle) {
                log::warn!("Could not retire tile '{}': {error}", winner.identity);
            }
        }

        let tile = match resolver
            .resolve(&winner.identity, self.tile_size)
            .resolving_tile(winner.identity.as_str())
        {
            Ok(tile) => tile,
            Err(error) => {
                log::warn!(
                    "Leaving region ({}, {}) unfilled: {error}",
                    cell.column,
                    cell.row
                );
                return Placement::ResolutionFailed {
                    identity: winner.identity.clone(),
                };
            }
        };

        self.composite(cell, &tile);
        log::debug!(
            "Region ({}, {}) <- '{}' at distance {:.4}",
            cell.column,
            cell.row,
            winner.identity,
            winner.distance
        );

        Placement::Composited {
            identity: winner.identity.clone(),
            distance: winner.distance,
        }
    }

    // Overwrite the cell rectangle; pixels past the canvas edge are dropped
    fn composite(&mut self, cell: &RegionCell, tile: &RgbImage) {
        let rect = cell.rect;
        let x = i64::from(rect.x);
        let y = i64::from(rect.y);

        if tile.width() > rect.width || tile.height() > rect.height {
            let fitted = imageops::crop_imm(
                tile,
                0,
                0,
                tile.width().min(rect.width),
                tile.height().min(rect.height),
            )
            .to_image();
            imageops::replace(&mut self.canvas, &fitted, x, y);
        } else {
            imageops::replace(&mut self.canvas, tile, x, y);
        }
    }
}

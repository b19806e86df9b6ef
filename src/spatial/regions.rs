//! Region planning: grid partitioning of the canvas and randomized visitation
//!
//! The grid deliberately over-covers the canvas by one cell in each
//! direction. Trailing cells either hang past the edge, in which case only
//! their visible part is compared and the composite is clipped, or lie
//! entirely outside, in which case they produce no region at all.

use crate::imaging::ops::{extract_region, mean_color, resize_to_fit, rgb_to_proxy};
use crate::imaging::{CropMode, ProxyImage};
use crate::io::error::{Result, invalid_parameter};
use image::RgbImage;
use rand::Rng;
use rand::seq::SliceRandom;

/// Axis-aligned rectangle in canvas pixel coordinates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rect {
    /// Left edge (inclusive)
    pub x: u32,
    /// Top edge (inclusive)
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Rect {
    /// Create a rectangle from its top-left corner and size
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (exclusive)
    pub const fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive)
    pub const fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Test whether the rectangle covers no pixels
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Intersect with the `[0, width) × [0, height)` canvas
    ///
    /// Returns `None` when nothing of the rectangle is visible.
    pub fn clip_to(&self, width: u32, height: u32) -> Option<Self> {
        let right = self.right().min(width);
        let bottom = self.bottom().min(height);
        (self.x < right && self.y < bottom)
            .then(|| Self::new(self.x, self.y, right - self.x, bottom - self.y))
    }
}

/// One cell of the region grid
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionCell {
    /// Grid column (x direction)
    pub column: u32,
    /// Grid row (y direction)
    pub row: u32,
    /// Target rectangle on the canvas
    pub rect: Rect,
}

/// Partitions a canvas into tile-sized cells
#[derive(Clone, Copy, Debug)]
pub struct RegionPlanner {
    tile_size: u32,
}

impl RegionPlanner {
    /// Create a planner for square cells of `tile_size` pixels
    ///
    /// # Errors
    ///
    /// Returns an error if `tile_size` is zero
    pub fn new(tile_size: u32) -> Result<Self> {
        if tile_size == 0 {
            return Err(invalid_parameter(
                "tile_size",
                &tile_size,
                &"must be positive",
            ));
        }
        Ok(Self { tile_size })
    }

    /// Edge length of each cell
    pub const fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Grid dimensions (columns, rows) for a canvas, including the overhang cell
    pub const fn grid_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        (width / self.tile_size + 1, height / self.tile_size + 1)
    }

    /// Enumerate every cell in column-major order
    pub fn plan(&self, width: u32, height: u32) -> Vec<RegionCell> {
        let (columns, rows) = self.grid_dimensions(width, height);
        let size = self.tile_size;

        (0..columns)
            .flat_map(|column| {
                (0..rows).map(move |row| RegionCell {
                    column,
                    row,
                    rect: Rect::new(
                        column.saturating_mul(size),
                        row.saturating_mul(size),
                        size,
                        size,
                    ),
                })
            })
            .collect()
    }

    /// Enumerate every cell in a shuffled order drawn from `rng`
    pub fn visitation_order<R: Rng + ?Sized>(
        &self,
        width: u32,
        height: u32,
        rng: &mut R,
    ) -> Vec<RegionCell> {
        let mut cells = self.plan(width, height);
        shuffle_regions(&mut cells, rng);
        cells
    }
}

/// Uniform Fisher–Yates shuffle of the visitation order
pub fn shuffle_regions<R: Rng + ?Sized>(cells: &mut [RegionCell], rng: &mut R) {
    cells.shuffle(rng);
}

/// A cell together with its comparison proxy
#[derive(Clone, Debug)]
pub struct Region {
    /// The grid cell this region fills
    pub cell: RegionCell,
    /// Visible part of the cell rendered at the comparison size
    pub proxy: ProxyImage,
    /// Mean color of the proxy
    pub mean: f64,
}

impl Region {
    /// Render the proxy for `cell` from the canvas
    ///
    /// Returns `None` for cells that lie entirely outside the canvas.
    pub fn from_canvas(
        cell: RegionCell,
        canvas: &RgbImage,
        compare_size: u32,
        crop_mode: CropMode,
    ) -> Option<Self> {
        let visible = extract_region(canvas, cell.rect)?;
        let small = resize_to_fit(&visible, compare_size, compare_size, crop_mode);
        Some(Self {
            cell,
            mean: mean_color(&small),
            proxy: rgb_to_proxy(&small),
        })
    }
}

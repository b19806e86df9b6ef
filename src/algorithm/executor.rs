use crate::algorithm::assembly::{Assembler, Placement};
use crate::algorithm::cancellation::CancellationToken;
use crate::algorithm::prefilter::MeanColorPrefilter;
use crate::algorithm::reducer::ParallelReducer;
use crate::imaging::ops::scale_to_cover;
use crate::io::configuration::MosaicConfig;
use crate::io::error::{MosaicError, Result};
use crate::io::progress::{BuildProgress, NoProgress};
use crate::io::store::TileResolver;
use crate::spatial::{Region, RegionCell, RegionPlanner, TileCorpus, TileId};
use bitvec::prelude::*;
use image::RgbImage;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::{Duration, Instant};

/// Outcome of one region in visitation order
#[derive(Clone, Debug, PartialEq)]
pub struct RegionPlacement {
    /// The grid cell
    pub cell: RegionCell,
    /// What was done with it
    pub placement: Placement,
}

/// Counters and timings of a finished build
#[derive(Clone, Debug, Default)]
pub struct BuildReport {
    /// Seed of the region visitation order
    pub seed: u64,
    /// Grid cells visited, including those outside the canvas
    pub regions: usize,
    /// Cells skipped because they lie entirely outside the canvas
    pub skipped_outside: usize,
    /// Regions that received a tile
    pub composited: usize,
    /// Regions without any qualifying candidate
    pub no_winner: usize,
    /// Regions whose winner could not be resolved
    pub resolution_failures: usize,
    /// Full distance computations over the whole build
    pub comparisons: usize,
    /// Candidates rejected by the prefilter over the whole build
    pub prefiltered: usize,
    /// Per-region outcomes in visitation order
    pub placements: Vec<RegionPlacement>,
    /// Tiles skipped for lacking a thumbnail, each listed once in the order
    /// they were first met
    pub missing_thumbnails: Vec<TileId>,
    /// Time spent rendering region proxies
    pub region_time: Duration,
    /// Time spent in distance computations, summed over workers
    pub compare_time: Duration,
    /// Time spent resolving and compositing winners
    pub load_time: Duration,
    /// Wall time of the build
    pub total_time: Duration,
}

impl BuildReport {
    // Single place where per-region outcomes are counted
    fn record(&mut self, cell: RegionCell, placement: Placement) {
        match &placement {
            Placement::Composited { .. } => self.composited += 1,
            Placement::NoWinner => self.no_winner += 1,
            Placement::ResolutionFailed { .. } => self.resolution_failures += 1,
            Placement::OutsideCanvas => self.skipped_outside += 1,
        }
        self.placements.push(RegionPlacement { cell, placement });
    }
}

/// A finished mosaic and how it was made
#[derive(Clone, Debug)]
pub struct Mosaic {
    /// The composited canvas
    pub image: RgbImage,
    /// Build statistics
    pub report: BuildReport,
}

/// Runs mosaic builds with one configuration and one worker pool
pub struct MosaicExecutor {
    config: MosaicConfig,
    planner: RegionPlanner,
    reducer: ParallelReducer,
    cancellation: CancellationToken,
}

impl MosaicExecutor {
    /// Validate `config` and start the worker pool
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration fails validation
    /// - The worker pool cannot be started
    pub fn new(config: MosaicConfig) -> Result<Self> {
        config.validate()?;
        let planner = RegionPlanner::new(config.tile_size)?;
        let prefilter = MeanColorPrefilter::new(config.compare_dist)?;
        let reducer = ParallelReducer::new(config.workers, prefilter)?;

        Ok(Self {
            config,
            planner,
            reducer,
            cancellation: CancellationToken::new(),
        })
    }

    /// Observe an externally owned cancellation token
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Token that cancels builds run by this executor
    pub const fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Active configuration
    pub const fn config(&self) -> &MosaicConfig {
        &self.config
    }

    /// Build a mosaic of `master` out of the live tiles in `corpus`
    ///
    /// Regions are processed one at a time in a seeded random order. With
    /// uniqueness on, every winner is removed from `corpus`. Per-tile and
    /// per-region failures are logged and never abort the build.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The scaled master would exceed the output size limit
    /// - The cancellation token is set before the last region is processed
    pub fn build<R: TileResolver + ?Sized>(
        &self,
        master: &RgbImage,
        corpus: &mut TileCorpus,
        resolver: &R,
        progress: &dyn BuildProgress,
    ) -> Result<Mosaic> {
        let started = Instant::now();
        let config = &self.config;

        let canvas = scale_to_cover(master, config.output_size)?;
        let (width, height) = canvas.dimensions();
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let cells = self.planner.visitation_order(width, height, &mut rng);
        let (columns, rows) = self.planner.grid_dimensions(width, height);

        log::info!(
            "Building {width}x{height} mosaic: {columns}x{rows} regions, {} tiles, seed {seed}",
            corpus.len()
        );

        let mut assembler = Assembler::new(canvas, config.unique, config.tile_size);
        let mut reported_missing: BitVec = BitVec::repeat(false, corpus.capacity());
        let mut report = BuildReport {
            seed,
            ..BuildReport::default()
        };

        progress.start("Building", cells.len());
        for cell in cells {
            if self.cancellation.is_cancelled() {
                progress.finish();
                log::warn!("Build cancelled after {} regions", report.regions);
                return Err(MosaicError::Cancelled {
                    regions_completed: report.regions,
                });
            }
            report.regions += 1;

            let region_started = Instant::now();
            let region = Region::from_canvas(
                cell,
                assembler.canvas(),
                config.compare_size,
                config.crop_mode,
            );
            report.region_time += region_started.elapsed();

            let Some(region) = region else {
                log::debug!(
                    "Region ({}, {}) lies outside the canvas",
                    cell.column,
                    cell.row
                );
                report.record(cell, Placement::OutsideCanvas);
                progress.advance();
                continue;
            };

            let outcome = self.reducer.find_best(&region, corpus, &self.cancellation);
            if self.cancellation.is_cancelled() {
                // Partial scan; its winner is not trustworthy
                progress.finish();
                log::warn!("Build cancelled after {} regions", report.regions - 1);
                return Err(MosaicError::Cancelled {
                    regions_completed: report.regions - 1,
                });
            }
            report.comparisons += outcome.comparisons;
            report.prefiltered += outcome.prefiltered;
            report.compare_time += outcome.compare_time;

            for handle in &outcome.missing_thumbnails {
                let already = reported_missing
                    .get(handle.index())
                    .as_deref()
                    .copied()
                    .unwrap_or(true);
                if !already {
                    reported_missing.set(handle.index(), true);
                    if let Some(tile) = corpus.get(*handle) {
                        log::warn!("Tile '{}' has no thumbnail; skipping", tile.identity());
                        report.missing_thumbnails.push(tile.identity().clone());
                    }
                }
            }

            let load_started = Instant::now();
            let placement =
                assembler.assemble(&cell, outcome.winner.as_ref(), corpus, resolver);
            report.load_time += load_started.elapsed();

            report.record(cell, placement);
            progress.advance();
        }
        progress.finish();

        report.total_time = started.elapsed();
        log::info!(
            "Composited {} of {} regions ({} without a match, {} unresolved) using {} comparisons",
            report.composited,
            report.regions - report.skipped_outside,
            report.no_winner,
            report.resolution_failures,
            report.comparisons
        );
        log::info!(
            "Region time {:.2?}, compare time {:.2?}, load time {:.2?}, total {:.2?}, seed {}",
            report.region_time,
            report.compare_time,
            report.load_time,
            report.total_time,
            report.seed
        );

        Ok(Mosaic {
            image: assembler.into_canvas(),
            report,
        })
    }
}

/// Build a mosaic in one call without progress reporting or cancellation
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the worker pool
/// cannot be started or the scaled master exceeds the output size limit
pub fn build<R: TileResolver + ?Sized>(
    master: &RgbImage,
    corpus: &mut TileCorpus,
    resolver: &R,
    config: &MosaicConfig,
) -> Result<Mosaic> {
    MosaicExecutor::new(config.clone())?.build(master, corpus, resolver, &NoProgress)
}

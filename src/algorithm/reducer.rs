//! Parallel nearest-tile search for a single region
//!
//! One rayon pool is built per executor and reused for every region. The
//! corpus scan is bridged into the pool from a single sequential iterator,
//! and all workers fold their results into one mutex-guarded accumulator.

use crate::algorithm::cancellation::CancellationToken;
use crate::algorithm::distance::proxy_distance;
use crate::algorithm::prefilter::MeanColorPrefilter;
use crate::io::configuration::WORST_DISTANCE;
use crate::io::error::{MosaicError, Result, invalid_parameter};
use crate::spatial::{Region, TileCorpus, TileHandle, TileId};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Winning tile for a region
#[derive(Clone, Debug, PartialEq)]
pub struct BestMatch {
    /// Corpus handle of the winner
    pub handle: TileHandle,
    /// Identity used to resolve the full-resolution tile
    pub identity: TileId,
    /// Distance between the region proxy and the winner's thumbnail
    pub distance: f64,
}

/// Everything the search for one region produced
#[derive(Clone, Debug, Default)]
pub struct MatchOutcome {
    /// Minimum-distance tile, or `None` if no candidate qualified
    pub winner: Option<BestMatch>,
    /// Full distance computations performed
    pub comparisons: usize,
    /// Tiles rejected by the mean-color prefilter
    pub prefiltered: usize,
    /// Candidates skipped because the distance could not be computed
    pub comparison_errors: usize,
    /// Live tiles that have no thumbnail, in handle order
    pub missing_thumbnails: Vec<TileHandle>,
    /// Wall time summed over all distance computations
    pub compare_time: Duration,
}

// Shared accumulator for one region
struct MatchState {
    best_distance: f64,
    best_handle: Option<TileHandle>,
    best_identity: Option<TileId>,
    comparisons: usize,
    compare_time: Duration,
}

impl MatchState {
    const fn new() -> Self {
        Self {
            best_distance: WORST_DISTANCE,
            best_handle: None,
            best_identity: None,
            comparisons: 0,
            compare_time: Duration::ZERO,
        }
    }

    fn record(&mut self, handle: TileHandle, identity: &TileId, distance: f64, elapsed: Duration) {
        self.comparisons += 1;
        self.compare_time += elapsed;
        if distance < self.best_distance {
            self.best_distance = distance;
            self.best_handle = Some(handle);
            self.best_identity = Some(identity.clone());
        }
    }

    fn into_winner(self) -> Option<BestMatch> {
        match (self.best_handle, self.best_identity) {
            (Some(handle), Some(identity)) => Some(BestMatch {
                handle,
                identity,
                distance: self.best_distance,
            }),
            _ => None,
        }
    }
}

/// Fixed-size worker pool that reduces a corpus scan to its best match
pub struct ParallelReducer {
    pool: ThreadPool,
    workers: usize,
    prefilter: MeanColorPrefilter,
}

impl ParallelReducer {
    /// Start a pool of `workers` threads
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `workers` is zero
    /// - The operating system refuses to spawn the threads
    pub fn new(workers: usize, prefilter: MeanColorPrefilter) -> Result<Self> {
        if workers == 0 {
            return Err(invalid_parameter("workers", &workers, &"must be positive"));
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("tesselate-match-{index}"))
            .build()
            .map_err(|source| MosaicError::WorkerPool { workers, source })?;

        Ok(Self {
            pool,
            workers,
            prefilter,
        })
    }

    /// Number of worker threads
    pub const fn workers(&self) -> usize {
        self.workers
    }

    /// Prefilter applied before every comparison
    pub const fn prefilter(&self) -> &MeanColorPrefilter {
        &self.prefilter
    }

    /// Search the live corpus for the tile closest to `region`
    ///
    /// Returns once every worker has finished. With exact ties any one of
    /// the minimizers may win. A set cancellation token stops workers from
    /// picking up further tiles; the partial result is still returned.
    pub fn find_best(
        &self,
        region: &Region,
        corpus: &TileCorpus,
        cancellation: &CancellationToken,
    ) -> MatchOutcome {
        let state = Mutex::new(MatchState::new());
        let missing = Mutex::new(Vec::new());
        let prefiltered = AtomicUsize::new(0);
        let comparison_errors = AtomicUsize::new(0);

        self.pool.install(|| {
            corpus.iter().par_bridge().for_each(|(handle, tile)| {
                if cancellation.is_cancelled() {
                    return;
                }

                let Some(thumbnail) = tile.thumbnail() else {
                    missing
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push(handle);
                    return;
                };

                if !self.prefilter.admits(region.mean, tile.mean()) {
                    prefiltered.fetch_add(1, Ordering::Relaxed);
                    return;
                }

                let started = Instant::now();
                match proxy_distance(&region.proxy, thumbnail) {
                    Ok(distance) => {
                        let elapsed = started.elapsed();
                        state
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .record(handle, tile.identity(), distance, elapsed);
                    }
                    Err(error) => {
                        comparison_errors.fetch_add(1, Ordering::Relaxed);
                        log::warn!("Skipping tile '{}': {error}", tile.identity());
                    }
                }
            });
        });

        let state = state.into_inner().unwrap_or_else(PoisonError::into_inner);
        let mut missing_thumbnails = missing.into_inner().unwrap_or_else(PoisonError::into_inner);
        missing_thumbnails.sort_unstable();

        MatchOutcome {
            comparisons: state.comparisons,
            compare_time: state.compare_time,
            winner: state.into_winner(),
            prefiltered: prefiltered.into_inner(),
            comparison_errors: comparison_errors.into_inner(),
            missing_thumbnails,
        }
    }
}

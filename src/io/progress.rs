//! Progress reporting for corpus loading, cache import and mosaic builds

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::{LazyLock, Mutex, PoisonError};

/// Receives progress from long-running phases
///
/// Methods take `&self` so a single reporter can be shared with worker
/// threads.
pub trait BuildProgress: Sync {
    /// A new phase with `total` steps begins
    fn start(&self, phase: &str, total: usize);

    /// One step of the current phase completed
    fn advance(&self);

    /// The current phase is over
    fn finish(&self);
}

/// Discards all progress
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl BuildProgress for NoProgress {
    fn start(&self, _phase: &str, _total: usize) {}

    fn advance(&self) {}

    fn finish(&self) {}
}

static PHASE_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {msg:>12} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

/// Terminal progress bar, one bar per phase
pub struct ProgressManager {
    bar: Mutex<Option<ProgressBar>>,
    hidden: bool,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressManager {
    /// Draw bars on stderr
    pub const fn new() -> Self {
        Self {
            bar: Mutex::new(None),
            hidden: false,
        }
    }

    /// Track progress without drawing anything
    pub const fn hidden() -> Self {
        Self {
            bar: Mutex::new(None),
            hidden: true,
        }
    }

    /// Position of the current phase, if one is running
    pub fn position(&self) -> Option<u64> {
        self.bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(ProgressBar::position)
    }

    /// Length of the current phase, if one is running
    pub fn length(&self) -> Option<u64> {
        self.bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(ProgressBar::length)
    }
}

impl BuildProgress for ProgressManager {
    fn start(&self, phase: &str, total: usize) {
        let bar = ProgressBar::new(total as u64);
        if self.hidden {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        bar.set_style(PHASE_STYLE.clone());
        bar.set_message(phase.to_string());

        let previous = self
            .bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(bar);
        if let Some(previous) = previous {
            previous.finish_and_clear();
        }
    }

    fn advance(&self) {
        if let Some(bar) = self
            .bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            bar.inc(1);
        }
    }

    fn finish(&self) {
        if let Some(bar) = self
            .bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            bar.finish_and_clear();
        }
    }
}

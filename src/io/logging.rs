//! Terminal logger installation

use crate::io::error::{MosaicError, Result};
use log::LevelFilter;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

/// Map the `--quiet` flag and the `--verbose` count to a level
///
/// Quiet wins over any verbosity.
pub const fn level_for(quiet: bool, verbose: u8) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install a stderr logger at `level`
///
/// # Errors
///
/// Returns [`MosaicError::LoggerInit`] if a logger is already installed
pub fn init_logging(level: LevelFilter) -> Result<()> {
    let config = ConfigBuilder::new()
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .build();

    TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto)
        .map_err(|source| MosaicError::LoggerInit { source })
}

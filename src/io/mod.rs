/// Command-line front end
pub mod cli;
/// Build constants and runtime configuration
pub mod configuration;
/// Error types and tile context helpers
pub mod error;
/// Mosaic export
pub mod image;
/// Pre-rendering tiles into a cache directory
pub mod import;
/// Logger installation
pub mod logging;
/// Progress reporting
pub mod progress;
/// Tile stores and corpus population
pub mod store;

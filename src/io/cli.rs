//! Command-line interface: build mosaics and pre-render tile caches

use crate::algorithm::executor::MosaicExecutor;
use crate::imaging::CropMode;
use crate::imaging::ops::{load_image, to_srgb};
use crate::io::configuration::{
    DEFAULT_CACHE_LABEL, DEFAULT_COMPARE_DIST, DEFAULT_COMPARE_SIZE, DEFAULT_IMPORT_WORKERS,
    DEFAULT_OUTPUT, DEFAULT_OUTPUT_SIZE, DEFAULT_TILE_SIZE, DEFAULT_WORKERS, MosaicConfig,
    OUTPUT_JPEG_QUALITY,
};
use crate::io::error::Result;
use crate::io::image::save_mosaic;
use crate::io::import::CacheImporter;
use crate::io::logging::{init_logging, level_for};
use crate::io::progress::{BuildProgress, ProgressManager};
use crate::io::store::{CacheStore, GlobStore, TilePreparation, TileStore, populate_corpus};
use clap::{ArgAction, ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tesselate")]
#[command(
    author,
    version,
    about = "Assemble photo mosaics from a corpus of tile images"
)]
/// Command-line arguments
pub struct Cli {
    /// What to do
    #[command(subcommand)]
    pub command: Command,

    /// Only log errors and hide progress bars
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log more detail (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a mosaic of a seed image
    Build(BuildArgs),
    /// Pre-render tiles into a cache directory at one size
    Import(ImportArgs),
}

/// Arguments of `tesselate build`
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["tiles", "cache"])))]
pub struct BuildArgs {
    /// Image to recreate
    #[arg(long, value_name = "FILE")]
    pub seed_image: PathBuf,

    /// Glob pattern of tile images
    #[arg(long, value_name = "GLOB")]
    pub tiles: Option<String>,

    /// Cache directory filled by `tesselate import`
    #[arg(long, value_name = "DIR")]
    pub cache: Option<PathBuf>,

    /// Label of the cache entries to use
    #[arg(long, default_value = DEFAULT_CACHE_LABEL)]
    pub label: String,

    /// Output file; the extension selects the format
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Shorter side of the output in pixels
    #[arg(long, default_value_t = DEFAULT_OUTPUT_SIZE)]
    pub output_size: u32,

    /// Edge length of each tile in the output
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE)]
    pub tile_size: u32,

    /// Edge length of the comparison proxies
    #[arg(long, default_value_t = DEFAULT_COMPARE_SIZE)]
    pub compare_size: u32,

    /// Maximum mean-color difference of a candidate tile
    #[arg(long, default_value_t = DEFAULT_COMPARE_DIST)]
    pub compare_dist: f64,

    /// Allow a tile to fill more than one region
    #[arg(long)]
    pub no_unique: bool,

    /// Number of comparison threads
    #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Seed for the region order; random when omitted
    #[arg(long)]
    pub shuffle_seed: Option<u64>,

    /// How images are cropped to square
    #[arg(long, value_enum, default_value_t = CropMode::Attention)]
    pub crop: CropMode,
}

impl BuildArgs {
    /// Collect the build knobs
    pub const fn to_config(&self) -> MosaicConfig {
        MosaicConfig {
            output_size: self.output_size,
            tile_size: self.tile_size,
            compare_size: self.compare_size,
            compare_dist: self.compare_dist,
            unique: !self.no_unique,
            workers: self.workers,
            seed: self.shuffle_seed,
            crop_mode: self.crop,
        }
    }
}

/// Arguments of `tesselate import`
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Glob pattern of source images
    #[arg(long, value_name = "GLOB")]
    pub tiles: String,

    /// Cache directory to fill
    #[arg(long, value_name = "DIR")]
    pub cache: PathBuf,

    /// Label of the written entries
    #[arg(long, default_value = DEFAULT_CACHE_LABEL)]
    pub label: String,

    /// Edge length of the rendered tiles
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE)]
    pub tile_size: u32,

    /// Number of import threads
    #[arg(short, long, default_value_t = DEFAULT_IMPORT_WORKERS)]
    pub workers: usize,
}

/// Executes a parsed command line
pub struct CommandRunner {
    cli: Cli,
    progress: ProgressManager,
}

impl CommandRunner {
    /// Create a runner for the given arguments
    pub const fn new(cli: Cli) -> Self {
        let progress = if cli.should_show_progress() {
            ProgressManager::new()
        } else {
            ProgressManager::hidden()
        };
        Self { cli, progress }
    }

    /// Install logging and run the subcommand
    ///
    /// # Errors
    ///
    /// Returns an error if logging cannot be installed or the subcommand fails
    pub fn run(&self) -> Result<()> {
        init_logging(level_for(self.cli.quiet, self.cli.verbose))?;

        match &self.cli.command {
            Command::Build(args) => self.run_build(args),
            Command::Import(args) => self.run_import(args),
        }
    }

    fn run_build(&self, args: &BuildArgs) -> Result<()> {
        let config = args.to_config();
        let executor = MosaicExecutor::new(config.clone())?;
        let master = to_srgb(&load_image(&args.seed_image)?);

        let store: Box<dyn TileStore> = match (&args.tiles, &args.cache) {
            (Some(pattern), _) => Box::new(GlobStore::new(
                pattern,
                TilePreparation {
                    crop: config.crop_mode,
                    ..TilePreparation::default()
                },
            )?),
            (None, Some(dir)) => Box::new(CacheStore::new(dir, &args.label)?),
            (None, None) => {
                return Err(crate::io::error::invalid_parameter(
                    "tiles",
                    &"<none>",
                    &"either --tiles or --cache is required",
                ));
            }
        };

        let progress: &dyn BuildProgress = &self.progress;
        let mut corpus = populate_corpus(store.as_ref(), config.compare_size, progress)?;
        let mosaic = executor.build(&master, &mut corpus, store.as_ref(), progress)?;
        save_mosaic(&mosaic.image, &args.output, OUTPUT_JPEG_QUALITY)
    }

    fn run_import(&self, args: &ImportArgs) -> Result<()> {
        let importer = CacheImporter::new(&args.cache, &args.label, args.tile_size, args.workers)?;
        importer.run(&args.tiles, &self.progress)?;
        Ok(())
    }
}

//! CLI entry point for building photo mosaics

use clap::Parser;
use tesselate::io::cli::{Cli, CommandRunner};

fn main() -> tesselate::Result<()> {
    let cli = Cli::parse();
    CommandRunner::new(cli).run()
}

//! tunefetch CLI - YouTube audio downloader

use clap::Parser;
use eyre::Result;
use tunefetch::cli::{Cli, run_cli};

fn main() -> Result<()> {
    color_eyre::install()?;

    let logging = tunefetch::logging::init();

    run_cli(Cli::parse(), Some(&logging))
}

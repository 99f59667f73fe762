//! CLI argument definitions using clap.

use crate::config::{Config, ConfigStore, DEFAULT_CONFIG_PATH};
use crate::logging::Logging;
use clap::{Parser, Subcommand};
use color_eyre::Section;
use eyre::{Context, Result};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "tunefetch")]
#[command(about = "Download YouTube playlists, channels and videos as MP3 files")]
#[command(version)]
pub struct Cli {
    /// Configuration file, created with defaults when missing
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate and classify a URL
    Check(crate::check::Args),

    /// Show playlist or video information without downloading
    Info(crate::info::Args),

    /// Download audio interactively
    Dl(crate::dl::Args),

    /// Show or edit the configuration file
    Config(crate::settings::Args),
}

/// Execute CLI command - separated for testing.
pub fn run_cli(cli: Cli, logging: Option<&Logging>) -> Result<()> {
    tracing::debug!(?cli, "parsed arguments");

    let store = ConfigStore::new(cli.config);

    match cli.command {
        Commands::Check(args) => crate::check::execute(args),
        Commands::Info(args) => crate::info::execute(args, &load_config(&store, logging)?),
        Commands::Dl(args) => {
            let request = args.try_into()?;
            crate::dl::execute(request, &store, load_config(&store, logging)?)
        }
        Commands::Config(args) => crate::settings::execute(args, &store),
    }
}

fn load_config(store: &ConfigStore, logging: Option<&Logging>) -> Result<Config> {
    let config = store
        .load()
        .wrap_err_with(|| format!("failed to load configuration from {}", store.path().display()))
        .with_suggestion(|| "fix the file or delete it to regenerate the defaults")?;

    if let Some(logging) = logging {
        logging.apply(config.log_level);
    }

    Ok(config)
}

//! Info subcommand - show what a URL contains without downloading.

use crate::config::Config;
use crate::prompt;
use crate::retrieval::Retriever;
use crate::validator;
use color_eyre::Section;
use eyre::{Context, Result};
use std::io::{self, Write};
use tunefetch_dl::dl::{Engine, YtDlp};

#[derive(clap::Args, Debug)]
pub struct Args {
    /// Playlist, video or channel URL
    pub url: String,
}

pub fn execute(args: Args, config: &Config) -> Result<()> {
    let mut out = io::stdout().lock();
    show(YtDlp, config, &args.url, &mut out)
}

fn show<E: Engine>(engine: E, config: &Config, url: &str, out: &mut impl Write) -> Result<()> {
    let kind = validator::validate(url).wrap_err_with(|| format!("cannot inspect {url}"))?;

    tracing::info!(url, %kind, "fetching info");

    let collection = Retriever::new(engine, config)
        .extract_collection(url)
        .map_err(|err| {
            let hint = err.hint();
            eyre::Report::new(err).suggestion(hint)
        })?;

    writeln!(out, "Kind:         {kind}")?;
    prompt::collection_summary(out, &collection)?;

    Ok(())
}

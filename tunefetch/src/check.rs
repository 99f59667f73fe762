//! Check subcommand - validate and classify a URL without network access.

use crate::validator::{self, UrlKind};
use color_eyre::Section;
use eyre::Result;
use std::io::{self, Write};

#[derive(clap::Args, Debug)]
pub struct Args {
    /// URL to check
    pub url: String,
}

pub fn execute(args: Args) -> Result<()> {
    let mut out = io::stdout().lock();
    report(&mut out, &args.url)
}

fn report(out: &mut impl Write, url: &str) -> Result<()> {
    tracing::debug!(url, "checking url");

    match validator::validate(url) {
        Ok(kind) => {
            writeln!(out, "Valid {kind} URL")?;
            if let Some(id) = validator::extract_collection_id(url) {
                let label = match kind {
                    UrlKind::Channel => "Channel ID",
                    _ => "Playlist ID",
                };
                writeln!(out, "{label}: {id}")?;
            }
            Ok(())
        }
        Err(err) => {
            writeln!(out, "Invalid URL: {err}")?;
            Err(eyre::Report::new(err)).with_suggestion(|| {
                "use a youtube.com, music.youtube.com or youtu.be playlist, video or channel link"
            })
        }
    }
}

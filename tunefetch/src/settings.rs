//! Config subcommand - inspect and edit the configuration file.

use crate::config::{Config, ConfigStore};
use clap::Subcommand;
use color_eyre::Section;
use eyre::{Context, Result, eyre};
use serde_json::{Map, Value};
use std::io::{self, Write};

#[derive(clap::Args, Debug)]
pub struct Args {
    #[command(subcommand)]
    pub action: Action,
}

#[derive(Debug, Subcommand)]
pub enum Action {
    /// Print the current configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Set one or more keys, e.g. `audio_quality=192k proxy_url=null`
    Set {
        #[arg(required = true, value_parser = parse_assignment)]
        assignments: Vec<(String, Value)>,
    },
}

/// Split `KEY=VALUE`; the value is JSON when it parses, a plain string otherwise.
pub fn parse_assignment(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {raw:?}"))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in {raw:?}"));
    }

    let value = value.trim();
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));

    Ok((key.to_string(), value))
}

pub fn execute(args: Args, store: &ConfigStore) -> Result<()> {
    let mut out = io::stdout().lock();
    run(args.action, store, &mut out)
}

fn run(action: Action, store: &ConfigStore, out: &mut impl Write) -> Result<()> {
    match action {
        Action::Path => writeln!(out, "{}", store.path().display())?,
        Action::Show => {
            let config = load(store)?;
            writeln!(out, "{}", serde_json::to_string_pretty(&config)?)?;
        }
        Action::Set { assignments } => {
            let mut partial = Map::new();

            for (key, value) in assignments {
                if !Config::FIELDS.contains(&key.as_str()) {
                    return Err(eyre!("unknown config key: {key}"))
                        .with_suggestion(|| {
                            format!("valid keys: {}", Config::FIELDS.join(", "))
                        });
                }
                partial.insert(key, value);
            }

            let mut config = load(store)?;
            store
                .update(&mut config, &Value::Object(partial.clone()))
                .wrap_err("failed to update configuration")?;

            for key in partial.keys() {
                tracing::info!(key = key.as_str(), "config key updated");
                writeln!(out, "{key} updated")?;
            }
        }
    }

    Ok(())
}

fn load(store: &ConfigStore) -> Result<Config> {
    store
        .load()
        .wrap_err_with(|| format!("failed to load {}", store.path().display()))
}

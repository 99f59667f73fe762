//! Dl subcommand - interactive download session.
//!
//! Flow: FFmpeg notice, settings prompts, URL prompt, validation, extraction,
//! summary, confirmation, transfer. Each finished session appends one line to
//! the session log.

use crate::config::{Config, ConfigError, ConfigStore};
use crate::files;
use crate::models::{CollectionInfo, DownloadRecord, TransferReport, safe_filename};
use crate::prompt::{self, Terminal};
use crate::retrieval::Retriever;
use crate::validator;
use color_eyre::Section;
use eyre::{Context, Result, eyre};
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tunefetch_dl::audio::AudioQuality;
use tunefetch_dl::dl::{Engine, YtDlp};

/// Sub-directory of the output directory holding metadata snapshots.
const METADATA_DIR: &str = "metadata";

/// CLI arguments for a download session.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// Playlist, video or channel URL (asked for when omitted)
    pub url: Option<String>,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Audio bitrate: 64k, 128k, 192k, 256k or 320k
    #[arg(short, long)]
    pub quality: Option<AudioQuality>,

    /// Proxy URL (http, https, socks4 or socks5), `none` to disable
    #[arg(long)]
    pub proxy: Option<String>,

    /// Hide yt-dlp progress output
    #[arg(long)]
    pub no_progress: bool,

    /// Start downloading without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Skip the interactive settings prompts
    #[arg(long)]
    pub no_setup: bool,

    /// Write collection info and download records to <output>/metadata/<id>.json
    #[arg(long)]
    pub save_metadata: bool,
}

/// Resolved download session.
#[derive(Debug)]
pub struct Request {
    pub url: Option<String>,
    /// Config keys overridden on the command line, persisted before the session
    pub overrides: Map<String, Value>,
    pub confirm: bool,
    pub setup: bool,
    pub save_metadata: bool,
    pub log_path: PathBuf,
}

impl TryFrom<Args> for Request {
    type Error = eyre::Error;

    fn try_from(args: Args) -> Result<Self> {
        let mut overrides = Map::new();

        if let Some(output) = args.output {
            overrides.insert(
                "output_directory".to_string(),
                Value::String(output.to_string_lossy().into_owned()),
            );
        }

        if let Some(quality) = args.quality {
            overrides.insert(
                "audio_quality".to_string(),
                Value::String(quality.as_str().to_string()),
            );
        }

        if let Some(proxy) = args.proxy {
            let value = if proxy.eq_ignore_ascii_case("none") {
                Value::Null
            } else if validator::validate_proxy(&proxy) {
                Value::String(proxy)
            } else {
                return Err(eyre!("invalid proxy URL: {proxy}"))
                    .with_suggestion(|| "use e.g. socks5://127.0.0.1:1080 or http://proxy:3128");
            };
            overrides.insert("proxy_url".to_string(), value);
        }

        if args.no_progress {
            overrides.insert("display_progress_bar".to_string(), Value::Bool(false));
        }

        Ok(Self {
            url: args.url,
            overrides,
            confirm: !args.yes,
            setup: !args.no_setup,
            save_metadata: args.save_metadata,
            log_path: PathBuf::from(files::SESSION_LOG_PATH),
        })
    }
}

/// How a session ended.
#[derive(Debug, PartialEq)]
pub enum Outcome {
    Completed(TransferReport),
    Cancelled,
    NoUrl,
    InvalidUrl(String),
    Failed(String),
}

impl Outcome {
    fn log_line(&self, url: &str) -> String {
        let timestamp = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default();

        let status = match self {
            Outcome::Completed(report) => format!(
                "completed downloaded={} skipped={}",
                report.downloaded(),
                report.skipped
            ),
            Outcome::Cancelled => "cancelled".to_string(),
            Outcome::NoUrl => "no-url".to_string(),
            Outcome::InvalidUrl(reason) => format!("invalid-url reason={reason:?}"),
            Outcome::Failed(reason) => format!("failed reason={reason:?}"),
        };

        format!("{timestamp} {status} url={url}")
    }
}

pub fn execute(request: Request, store: &ConfigStore, mut config: Config) -> Result<()> {
    let mut terminal = Terminal::stdio();

    match run_session(YtDlp, &mut terminal, &request, store, &mut config)? {
        Outcome::Completed(_) | Outcome::Cancelled => Ok(()),
        Outcome::NoUrl => Err(eyre!("no URL provided")),
        Outcome::InvalidUrl(reason) => Err(eyre!("invalid URL: {reason}"))
            .with_suggestion(|| "run `tunefetch check <URL>` to see how a URL is classified"),
        Outcome::Failed(reason) => Err(eyre!(reason))
            .with_note(|| format!("session log: {}", request.log_path.display())),
    }
}

/// Run one session against `engine`, talking to the user through `terminal`.
pub fn run_session<E, R, W>(
    engine: E,
    terminal: &mut Terminal<R, W>,
    request: &Request,
    store: &ConfigStore,
    config: &mut Config,
) -> Result<Outcome>
where
    E: Engine,
    R: BufRead,
    W: Write,
{
    tracing::info!("session started");

    prompt::welcome(terminal.output())?;
    prompt::ffmpeg_notice(terminal.output())?;

    if !request.overrides.is_empty() {
        store
            .update(config, &Value::Object(request.overrides.clone()))
            .wrap_err("invalid command-line settings")?;
    }

    if request.setup {
        interactive_setup(terminal, store, config)?;
    }

    let url = match &request.url {
        Some(url) => url.trim().to_string(),
        None => {
            prompt::url_help(terminal.output())?;
            terminal.read_line("YouTube URL: ")?.unwrap_or_default()
        }
    };

    let outcome = transfer(engine, terminal, request, config, &url)?;

    files::write_to_log(&outcome.log_line(&url), &request.log_path);
    tracing::info!(?outcome, "session finished");

    Ok(outcome)
}

fn transfer<E, R, W>(
    engine: E,
    terminal: &mut Terminal<R, W>,
    request: &Request,
    config: &Config,
    url: &str,
) -> Result<Outcome>
where
    E: Engine,
    R: BufRead,
    W: Write,
{
    if url.is_empty() {
        prompt::error(terminal.output(), "No URL provided.")?;
        return Ok(Outcome::NoUrl);
    }

    let kind = match validator::validate(url) {
        Ok(kind) => kind,
        Err(err) => {
            prompt::error(terminal.output(), &format!("Invalid URL: {err}"))?;
            return Ok(Outcome::InvalidUrl(err.to_string()));
        }
    };

    writeln!(terminal.output(), "Valid {kind} URL. Fetching information...")?;

    let retriever = Retriever::new(engine, config);

    let collection = match retriever.extract_collection(url) {
        Ok(collection) => collection,
        Err(err) => {
            tracing::error!(%err, "extraction failed");
            prompt::error(
                terminal.output(),
                &format!("Could not retrieve information: {err}"),
            )?;
            return Ok(Outcome::Failed(err.to_string()));
        }
    };

    prompt::collection_summary(terminal.output(), &collection)?;

    if request.confirm && !terminal.confirm("Start downloading now?", true)? {
        prompt::cancelled(terminal.output())?;
        return Ok(Outcome::Cancelled);
    }

    prompt::starting(terminal.output(), config, collection.item_count)?;

    let report = match retriever.download(url) {
        Ok(report) => report,
        Err(err) => {
            tracing::error!(%err, "download failed");
            prompt::error(terminal.output(), &err.to_string())?;
            writeln!(terminal.output(), "Hint: {}", err.hint())?;
            return Ok(Outcome::Failed(err.to_string()));
        }
    };

    prompt::success(terminal.output(), &config.output_directory, &report)?;

    if request.save_metadata {
        let path = metadata_path(&config.output_directory, &collection);
        let snapshot = MetadataSnapshot {
            collection: &collection,
            downloads: &report.records,
        };
        if files::save_metadata(&snapshot, &path) {
            writeln!(terminal.output(), "Metadata saved to {}", path.display())?;
        }
    }

    Ok(Outcome::Completed(report))
}

#[derive(Serialize)]
struct MetadataSnapshot<'a> {
    collection: &'a CollectionInfo,
    downloads: &'a [DownloadRecord],
}

fn metadata_path(output: &Path, collection: &CollectionInfo) -> PathBuf {
    let stem = if collection.id.is_empty() {
        safe_filename(&collection.title)
    } else {
        collection.id.clone()
    };
    output.join(METADATA_DIR).join(format!("{stem}.json"))
}

/// Ask for proxy, output directory, quality and progress display. Enter keeps a value.
fn interactive_setup<R: BufRead, W: Write>(
    terminal: &mut Terminal<R, W>,
    store: &ConfigStore,
    config: &mut Config,
) -> Result<()> {
    prompt::settings(terminal.output(), config)?;

    let current = config.proxy_url.clone().unwrap_or_else(|| "None".to_string());
    let proxy = terminal.ask_with_default("Proxy URL (none to disable)", &current)?;
    if proxy.eq_ignore_ascii_case("none") {
        if config.proxy_url.is_some() {
            apply(terminal, store, config, "proxy_url", Value::Null, "Proxy disabled.")?;
        }
    } else if proxy != current {
        if validator::validate_proxy(&proxy) {
            apply(terminal, store, config, "proxy_url", Value::String(proxy), "Proxy updated.")?;
        } else {
            tracing::warn!(%proxy, "invalid proxy url entered");
            writeln!(
                terminal.output(),
                "Invalid proxy URL format. Using previous setting."
            )?;
        }
    }

    let current = config.output_directory.to_string_lossy().into_owned();
    let output = terminal.ask_with_default("Output directory", &current)?;
    if output != current {
        apply(
            terminal,
            store,
            config,
            "output_directory",
            Value::String(output),
            "Output directory updated.",
        )?;
    }

    let current = config.audio_quality.as_str();
    let quality = terminal
        .ask_with_default("Audio quality (64k, 128k, 192k, 256k, 320k)", current)?
        .to_ascii_lowercase();
    if quality != current {
        apply(
            terminal,
            store,
            config,
            "audio_quality",
            Value::String(quality),
            "Audio quality updated.",
        )?;
    }

    let current = if config.display_progress_bar { "yes" } else { "no" };
    let answer = terminal.ask_with_default("Display progress bar (yes/no)", current)?;
    match prompt::parse_yes_no(&answer) {
        Some(show) if show != config.display_progress_bar => apply(
            terminal,
            store,
            config,
            "display_progress_bar",
            Value::Bool(show),
            "Progress bar setting updated.",
        )?,
        Some(_) => {}
        None => writeln!(terminal.output(), "Please answer yes or no. Using previous setting.")?,
    }

    writeln!(terminal.output(), "Configuration complete.\n")?;
    Ok(())
}

/// Persist one setting; invalid values are reported and the previous value kept.
fn apply<R: BufRead, W: Write>(
    terminal: &mut Terminal<R, W>,
    store: &ConfigStore,
    config: &mut Config,
    key: &str,
    value: Value,
    done: &str,
) -> Result<()> {
    let mut partial = Map::new();
    partial.insert(key.to_string(), value);

    match store.update(config, &Value::Object(partial)) {
        Ok(()) => {
            tracing::info!(key, "setting updated");
            writeln!(terminal.output(), "{done}")?;
            Ok(())
        }
        Err(ConfigError::Validation(reason)) => {
            tracing::warn!(key, %reason, "rejected setting");
            writeln!(terminal.output(), "Invalid value: {reason}. Using previous setting.")?;
            Ok(())
        }
        Err(err) => {
            Err(err).wrap_err_with(|| format!("failed to save {}", store.path().display()))
        }
    }
}

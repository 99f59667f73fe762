//! Metadata snapshots and the session log.
//!
//! Failures here are reported through `tracing` and never abort a session.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Default session log, relative to the working directory.
pub const SESSION_LOG_PATH: &str = "logs/tunefetch.log";

/// Write `value` as JSON indented by four spaces, creating parent directories.
pub fn save_metadata<T: Serialize>(value: &T, path: &Path) -> bool {
    match write_json(value, path) {
        Ok(()) => {
            tracing::info!(path = ?path.display(), "metadata saved");
            true
        }
        Err(err) => {
            tracing::error!(path = ?path.display(), %err, "failed to save metadata");
            false
        }
    }
}

/// Read a JSON document written by [`save_metadata`].
pub fn load_metadata<T: DeserializeOwned>(path: &Path) -> Option<T> {
    if !path.exists() {
        tracing::debug!(path = ?path.display(), "metadata file not found");
        return None;
    }

    let raw = fs::read_to_string(path)
        .inspect_err(|err| tracing::error!(path = ?path.display(), %err, "failed to read metadata"))
        .ok()?;

    let value = serde_json::from_str(&raw)
        .inspect_err(|err| tracing::error!(path = ?path.display(), %err, "invalid metadata json"))
        .ok()?;

    tracing::info!(path = ?path.display(), "metadata loaded");
    Some(value)
}

/// Append one line to the log at `path`.
pub fn write_to_log(message: &str, path: &Path) -> bool {
    match append_line(message, path) {
        Ok(()) => true,
        Err(err) => {
            tracing::error!(path = ?path.display(), %err, "failed to write log file");
            false
        }
    }
}

pub fn file_exists(path: &Path) -> bool {
    path.exists()
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> io::Result<()> {
    create_parent(path)?;

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;

    fs::write(path, buf)
}

fn append_line(message: &str, path: &Path) -> io::Result<()> {
    create_parent(path)?;

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{message}")
}

fn create_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

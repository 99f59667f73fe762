//! Persistent download configuration.
//!
//! The config lives in a flat JSON document. Every way of building a [`Config`]
//! (loading, partial updates) goes through [`Config::from_value`], so the quality
//! and log-level enums and the range checks are enforced on the merged record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tunefetch_dl::audio::AudioQuality;

/// Default config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Archive of downloaded IDs, kept by yt-dlp inside the output directory.
pub const ARCHIVE_FILE_NAME: &str = "downloaded_archive.txt";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error at {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("invalid json at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("validation error: {0}")]
    Validation(String),
}

/// Log verbosity, stored upper-case and accepted in any case.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }

    /// Equivalent `tracing` filter directive.
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error | LogLevel::Critical => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARNING" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            "CRITICAL" => Ok(LogLevel::Critical),
            _ => Err(ConfigError::Validation(format!(
                "invalid log level {s:?}, must be one of: DEBUG, INFO, WARNING, ERROR, CRITICAL"
            ))),
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, ConfigError> {
        value.parse()
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        level.as_str().to_string()
    }
}

/// Download settings. Field order is the key order of the JSON file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output_directory: PathBuf,
    pub proxy_url: Option<String>,
    pub audio_quality: AudioQuality,
    pub log_level: LogLevel,
    /// Keep an archive of downloaded IDs and skip them next time
    pub skip_downloaded: bool,
    /// First playlist index to download (1-based)
    pub download_start_index: Option<u32>,
    /// Last playlist index to download (inclusive)
    pub download_end_index: Option<u32>,
    pub max_downloads: Option<u32>,
    /// yt-dlp output template, relative to `output_directory`
    pub output_filename_template: String,
    pub embed_thumbnail: bool,
    pub add_metadata: bool,
    /// Seconds to wait before each download
    pub sleep_interval_between_videos: u64,
    pub force_overwrites: bool,
    pub display_progress_bar: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_directory: PathBuf::from("downloaded_youtube_music"),
            proxy_url: None,
            audio_quality: AudioQuality::K320,
            log_level: LogLevel::Info,
            skip_downloaded: true,
            download_start_index: None,
            download_end_index: None,
            max_downloads: None,
            output_filename_template: "%(playlist_index)s - %(title)s.%(ext)s".to_string(),
            embed_thumbnail: false,
            add_metadata: true,
            sleep_interval_between_videos: 0,
            force_overwrites: false,
            display_progress_bar: true,
        }
    }
}

impl Config {
    /// Build a validated config from a JSON object; missing keys take defaults.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let config: Config =
            serde_json::from_value(value).map_err(|err| ConfigError::Validation(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.download_start_index == Some(0) || self.download_end_index == Some(0) {
            return Err(ConfigError::Validation(
                "playlist indices start at 1".to_string(),
            ));
        }

        if let (Some(start), Some(end)) = (self.download_start_index, self.download_end_index)
            && start > end
        {
            return Err(ConfigError::Validation(format!(
                "download_start_index ({start}) is after download_end_index ({end})"
            )));
        }

        if self.output_filename_template.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output_filename_template must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Names of all configuration keys, in file order.
    pub const FIELDS: &[&str] = &[
        "output_directory",
        "proxy_url",
        "audio_quality",
        "log_level",
        "skip_downloaded",
        "download_start_index",
        "download_end_index",
        "max_downloads",
        "output_filename_template",
        "embed_thumbnail",
        "add_metadata",
        "sleep_interval_between_videos",
        "force_overwrites",
        "display_progress_bar",
    ];

    /// Where yt-dlp records downloaded IDs.
    pub fn archive_path(&self) -> PathBuf {
        self.output_directory.join(ARCHIVE_FILE_NAME)
    }
}

/// Reads and writes the config file.
#[derive(Clone, Debug)]
pub struct ConfigStore {
    path: PathBuf,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_PATH)
    }
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the config file, writing the defaults first when it does not exist.
    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.path.exists() {
            tracing::warn!(path = ?self.path.display(), "config file not found, creating default");
            self.save(&Config::default())?;
        }

        let raw = fs::read_to_string(&self.path).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;

        let value: Value = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })?;

        let config = Config::from_value(value)?;

        tracing::info!(path = ?self.path.display(), "configuration loaded");

        Ok(config)
    }

    /// Write the whole record as indented JSON.
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        ensure_parent(&self.path)?;

        let json = serde_json::to_string_pretty(config)
            .map_err(|err| ConfigError::Validation(err.to_string()))?;

        fs::write(&self.path, json + "\n").map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(path = ?self.path.display(), "configuration saved");

        Ok(())
    }

    /// Merge the keys of `partial` into `config`, validate, and persist.
    ///
    /// Keys that are not configuration fields are ignored. On any error `config`
    /// and the file are left as they were.
    pub fn update(&self, config: &mut Config, partial: &Value) -> Result<(), ConfigError> {
        let Value::Object(changes) = partial else {
            return Err(ConfigError::Validation(
                "config update must be a JSON object".to_string(),
            ));
        };

        let mut merged = match serde_json::to_value(&*config) {
            Ok(Value::Object(map)) => map,
            Ok(_) => Map::new(),
            Err(err) => return Err(ConfigError::Validation(err.to_string())),
        };

        for (key, value) in changes {
            match merged.get_mut(key) {
                Some(slot) => *slot = value.clone(),
                None => tracing::debug!(key = key.as_str(), "ignoring unknown config key"),
            }
        }

        let updated = Config::from_value(Value::Object(merged))?;
        self.save(&updated)?;
        *config = updated;

        Ok(())
    }
}

fn ensure_parent(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

//! yt-dlp Python API wrappers.
//!
//! Type-safe bindings to [yt-dlp](https://github.com/yt-dlp/yt-dlp) `YoutubeDL` parameters.
//! Parameters cross into Python as JSON, so unset fields are simply absent from the
//! params dict and yt-dlp applies its own defaults.
//!
//! ```no_run
//! use tunefetch_dl::dl::{DownloadOptions, Engine, YtDlp};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let info = YtDlp.extract_info("https://youtube.com/watch?v=example", &DownloadOptions::simulate(), false)?;
//! println!("Found: {:?}", info.and_then(|info| info.title));
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use crate::info::InfoDict;
use pyo3::ffi::c_str;
use pyo3::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

/// Filename templates using `%(field)s` syntax. Key `default` required.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct OutputTemplates(pub BTreeMap<String, String>);

impl OutputTemplates {
    /// Create with a single default template.
    pub fn simple(default: String) -> Self {
        Self(BTreeMap::from([("default".to_string(), default)]))
    }

    /// The template used for media files.
    pub fn default_template(&self) -> Option<&str> {
        self.0.get("default").map(String::as_str)
    }
}

/// Post-download operation, serialized as `{"key": ..., <arguments>}`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "key")]
pub enum PostProcessor {
    /// Convert the downloaded stream with FFmpeg.
    #[serde(rename = "FFmpegExtractAudio")]
    ExtractAudio {
        preferredcodec: String,
        /// Bitrate in kbps without unit, e.g. `"320"`
        preferredquality: String,
    },
    /// Embed the downloaded thumbnail as cover art.
    #[serde(rename = "EmbedThumbnail")]
    EmbedThumbnail { already_have_thumbnail: bool },
    /// Write title/uploader/etc. into the file tags.
    #[serde(rename = "FFmpegMetadata")]
    Metadata,
}

/// yt-dlp configuration passed to `YoutubeDL(params)`.
///
/// Only fields that are `Some` reach yt-dlp.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DownloadOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outtmpl: Option<OutputTemplates>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postprocessors: Option<Vec<PostProcessor>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub writethumbnail: Option<bool>,
    /// `http://`, `https://`, `socks4://` or `socks5://` proxy URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    /// Text file of already downloaded IDs, maintained by yt-dlp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_archive: Option<String>,
    /// Playlist range such as `"5:"` or `"1:10"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlist_items: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_downloads: Option<u32>,
    /// Seconds to sleep before each download
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleep_interval: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overwrites: Option<bool>,
    /// Report per-item errors and continue with the rest of a playlist
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignoreerrors: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simulate: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extract_flat: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiet: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_warnings: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noprogress: Option<bool>,
}

impl DownloadOptions {
    /// Metadata-only parameters: resolve every playlist entry, write nothing.
    pub fn simulate() -> Self {
        Self {
            simulate: Some(true),
            extract_flat: Some(false),
            quiet: Some(true),
            no_warnings: Some(true),
            ..Default::default()
        }
    }

    /// Serialize into the JSON object handed to `YoutubeDL(params)`.
    pub fn to_params(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Extraction/download capability.
///
/// [`YtDlp`] is the production engine; tests substitute canned responses.
pub trait Engine {
    /// Run `YoutubeDL.extract_info`, transferring media when `download` is true.
    ///
    /// Returns `None` when yt-dlp produced no info dict, which happens for
    /// unresolvable URLs when `ignoreerrors` is set.
    fn extract_info(
        &self,
        url: &str,
        opts: &DownloadOptions,
        download: bool,
    ) -> Result<Option<InfoDict>>;
}

/// In-process yt-dlp through the embedded Python interpreter.
///
/// Requires the `yt_dlp` package in the interpreter's environment and FFmpeg on `PATH`
/// for post-processing.
#[derive(Clone, Copy, Debug, Default)]
pub struct YtDlp;

impl Engine for YtDlp {
    fn extract_info(
        &self,
        url: &str,
        opts: &DownloadOptions,
        download: bool,
    ) -> Result<Option<InfoDict>> {
        let params = opts.to_params()?;

        tracing::debug!(url, download, %params, "calling yt-dlp");

        let raw = Python::attach(|py| -> Result<Option<String>> {
            let module =
                PyModule::from_code(py, c_str!(include_str!("./ytdlp.py")), c"ytdlp.py", c"ytdlp")?;

            match module
                .getattr("extract_info")?
                .call1((url, params, download))
            {
                Ok(info) => Ok(info.extract::<Option<String>>()?),
                Err(err) => Err(classify_py_err(py, &module, err)),
            }
        })?;

        raw.map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(Error::from)
    }
}

/// Separate yt-dlp's `DownloadError` from every other Python exception.
fn classify_py_err(py: Python<'_>, module: &Bound<'_, PyModule>, err: PyErr) -> Error {
    match module.getattr("DownloadError") {
        Ok(download_error) if err.is_instance(py, &download_error) => {
            Error::Download(err.value(py).to_string())
        }
        _ => Error::Python(err),
    }
}

//! Error types for tunefetch-dl.

use pyo3::PyErr;
use thiserror::Error;

/// Failure reported by the yt-dlp engine or the bridge around it.
#[derive(Debug, Error)]
pub enum Error {
    /// yt-dlp raised `yt_dlp.utils.DownloadError`
    #[error("yt-dlp: {0}")]
    Download(String),

    /// Any other Python exception, including a missing `yt_dlp` module
    #[error(transparent)]
    Python(#[from] PyErr),

    /// Parameters or info dict could not cross the JSON bridge
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether yt-dlp itself reported the failure.
    pub fn is_download_error(&self) -> bool {
        matches!(self, Error::Download(_))
    }
}

/// Result type alias for tunefetch-dl operations.
pub type Result<T> = std::result::Result<T, Error>;

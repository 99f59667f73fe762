//! Sanitized info dict returned by `YoutubeDL.extract_info`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Essential metadata from a yt-dlp info dict.
///
/// Every field is optional: yt-dlp omits keys an extractor could not fill, and
/// failed playlist entries arrive as `null` when `ignoreerrors` is set.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct InfoDict {
    /// Video or playlist identifier
    pub id: Option<String>,
    /// Video or playlist title
    pub title: Option<String>,
    /// Extractor name (e.g., "Youtube", "YoutubeTab")
    pub extractor_key: Option<String>,
    /// Full name of the uploader
    pub uploader: Option<String>,
    /// Nickname or ID of the uploader
    pub uploader_id: Option<String>,
    /// Length in seconds
    pub duration: Option<f64>,
    /// Upload date in UTC (YYYYMMDD)
    pub upload_date: Option<String>,
    pub description: Option<String>,
    /// URL to the webpage
    pub webpage_url: Option<String>,
    /// Media or entry URL, used when `webpage_url` is missing
    pub url: Option<String>,
    pub view_count: Option<u64>,
    pub like_count: Option<u64>,
    pub thumbnail: Option<String>,
    /// Number of entries the site reports for a playlist
    pub playlist_count: Option<u64>,
    /// Playlist entries; `None` for a single video
    pub entries: Option<Vec<Option<InfoDict>>>,
    /// Files produced by a download, after post-processing
    pub requested_downloads: Option<Vec<RequestedDownload>>,
    /// Final path when yt-dlp reports it at top level
    pub filepath: Option<PathBuf>,
}

/// One entry of `requested_downloads`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct RequestedDownload {
    pub filepath: Option<PathBuf>,
    pub ext: Option<String>,
}

impl InfoDict {
    /// Whether the dict describes a playlist-like container.
    pub fn is_playlist(&self) -> bool {
        self.entries.is_some()
    }

    /// Path of the file written for this entry, if it was downloaded.
    pub fn downloaded_path(&self) -> Option<&Path> {
        self.requested_downloads
            .iter()
            .flatten()
            .find_map(|d| d.filepath.as_deref())
            .or(self.filepath.as_deref())
    }

    /// Duration in whole seconds.
    pub fn duration_secs(&self) -> Option<u64> {
        self.duration
            .filter(|d| d.is_finite() && *d >= 0.0)
            .map(|d| d.round() as u64)
    }
}

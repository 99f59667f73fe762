//! Audio preset: best available audio stream → MP3 at a fixed bitrate.
//!
//! **Bitrates:** 64, 128, 192, 256 and 320 kbps ([`AudioQuality`])
//!
//! ```no_run
//! use tunefetch_dl::audio::{AudioPreset, AudioQuality};
//! use tunefetch_dl::dl::{DownloadOptions, Engine, YtDlp};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let opts: DownloadOptions = AudioPreset::new(AudioQuality::K192).into();
//! YtDlp.extract_info("https://youtube.com/watch?v=example", &opts, true)?;
//! # Ok(())
//! # }
//! ```

use crate::dl::{DownloadOptions, PostProcessor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target codec of the extraction step.
pub const AUDIO_CODEC: &str = "mp3";

/// Stream selector: best audio-only format, falling back to the best muxed one.
pub const AUDIO_FORMAT: &str = "bestaudio/best";

/// MP3 bitrate.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioQuality {
    #[serde(rename = "64k")]
    K64,
    #[serde(rename = "128k")]
    K128,
    #[serde(rename = "192k")]
    K192,
    #[serde(rename = "256k")]
    K256,
    #[default]
    #[serde(rename = "320k")]
    K320,
}

impl AudioQuality {
    pub const ALL: [AudioQuality; 5] = [
        AudioQuality::K64,
        AudioQuality::K128,
        AudioQuality::K192,
        AudioQuality::K256,
        AudioQuality::K320,
    ];

    /// Label with unit, as stored in the config file.
    pub fn as_str(self) -> &'static str {
        match self {
            AudioQuality::K64 => "64k",
            AudioQuality::K128 => "128k",
            AudioQuality::K192 => "192k",
            AudioQuality::K256 => "256k",
            AudioQuality::K320 => "320k",
        }
    }

    /// Bitrate without unit, as FFmpegExtractAudio expects it.
    pub fn kbps(self) -> &'static str {
        self.as_str().trim_end_matches('k')
    }
}

impl fmt::Display for AudioQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected bitrate label.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid audio quality {0:?}, must be one of: 64k, 128k, 192k, 256k, 320k")]
pub struct ParseQualityError(pub String);

impl FromStr for AudioQuality {
    type Err = ParseQualityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        AudioQuality::ALL
            .into_iter()
            .find(|q| q.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseQualityError(s.to_string()))
    }
}

/// Audio extraction with optional cover art and tags.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AudioPreset {
    pub quality: AudioQuality,
    pub embed_thumbnail: bool,
    pub add_metadata: bool,
}

impl AudioPreset {
    /// Extraction plus metadata tags, no thumbnail.
    pub fn new(quality: AudioQuality) -> Self {
        Self {
            quality,
            embed_thumbnail: false,
            add_metadata: true,
        }
    }
}

impl From<AudioPreset> for Vec<PostProcessor> {
    /// Extraction first, then thumbnail, then tags; FFmpeg runs them in this order.
    fn from(preset: AudioPreset) -> Self {
        let mut processors = vec![PostProcessor::ExtractAudio {
            preferredcodec: AUDIO_CODEC.to_string(),
            preferredquality: preset.quality.kbps().to_string(),
        }];

        if preset.embed_thumbnail {
            processors.push(PostProcessor::EmbedThumbnail {
                already_have_thumbnail: false,
            });
        }

        if preset.add_metadata {
            processors.push(PostProcessor::Metadata);
        }

        processors
    }
}

impl From<AudioPreset> for DownloadOptions {
    /// Best audio → MP3, keeps going past broken playlist entries.
    fn from(preset: AudioPreset) -> Self {
        Self {
            format: Some(AUDIO_FORMAT.to_string()),
            postprocessors: Some(preset.into()),
            // EmbedThumbnail needs the image on disk first
            writethumbnail: preset.embed_thumbnail.then_some(true),
            ignoreerrors: Some(true),
            simulate: Some(false),
            ..Default::default()
        }
    }
}

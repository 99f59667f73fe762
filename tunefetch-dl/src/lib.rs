//! Type-safe Rust bindings to the [yt-dlp](https://github.com/yt-dlp/yt-dlp) Python library.
//!
//! ## Modules
//!
//! - [`dl`] - `YoutubeDL` parameters and the [`dl::Engine`] seam
//! - [`audio`] - audio extraction preset (MP3 at a fixed bitrate)
//! - [`info`] - the sanitized info dict returned by `extract_info`
//! - [`error`] - engine errors
//!
//! ## Quick Start
//!
//! **Audio preset** (320 kbps MP3 with metadata):
//! ```no_run
//! use tunefetch_dl::audio::{AudioPreset, AudioQuality};
//! use tunefetch_dl::dl::{DownloadOptions, Engine, OutputTemplates, YtDlp};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut opts: DownloadOptions = AudioPreset::new(AudioQuality::K320).into();
//! opts.outtmpl = Some(OutputTemplates::simple("music/%(title)s.%(ext)s".to_string()));
//!
//! YtDlp.extract_info("https://youtube.com/watch?v=example", &opts, true)?;
//! # Ok(())
//! # }
//! ```
//!
//! **Metadata only**:
//! ```no_run
//! use tunefetch_dl::dl::{DownloadOptions, Engine, YtDlp};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let info = YtDlp.extract_info(
//!     "https://youtube.com/playlist?list=example",
//!     &DownloadOptions::simulate(),
//!     false,
//! )?;
//! if let Some(info) = info {
//!     println!("{}", info.title.unwrap_or_default());
//! }
//! # Ok(())
//! # }
//! ```

pub mod audio;
pub mod dl;
pub mod error;
pub mod info;

pub use error::{Error, Result};

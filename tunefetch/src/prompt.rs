//! Line-based terminal prompts and banners.

use crate::config::Config;
use crate::models::{CollectionInfo, TransferReport, format_compact};
use std::io::{self, BufRead, Stdin, Stdout, Write};
use std::path::Path;

const SAMPLE_ITEMS: usize = 3;
const DESCRIPTION_WIDTH: usize = 80;

/// Reads answers from `input` and writes prompts and banners to `output`.
pub struct Terminal<R, W> {
    input: R,
    output: W,
}

impl Terminal<io::StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        let stdin: Stdin = io::stdin();
        Self::new(stdin.lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Print `prompt` and read one trimmed line; `None` at end of input.
    pub fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Ask with the current value shown; an empty answer keeps it.
    pub fn ask_with_default(&mut self, label: &str, current: &str) -> io::Result<String> {
        let answer = self.read_line(&format!("{label} [{current}]: "))?;
        Ok(answer
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| current.to_string()))
    }

    /// Yes/no question; an empty or unrecognised answer picks `default`.
    pub fn confirm(&mut self, question: &str, default: bool) -> io::Result<bool> {
        let hint = if default { "Y/n" } else { "y/N" };
        let answer = self.read_line(&format!("{question} [{hint}]: "))?;
        Ok(answer.as_deref().and_then(parse_yes_no).unwrap_or(default))
    }
}

/// `yes`, `y`, `true`, `1` and their negatives, in any case.
pub fn parse_yes_no(answer: &str) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" | "1" => Some(true),
        "n" | "no" | "false" | "0" => Some(false),
        _ => None,
    }
}

pub fn banner(out: &mut impl Write, title: &str, lines: &[&str]) -> io::Result<()> {
    let rule = "=".repeat(title.chars().count().max(40));
    writeln!(out, "{rule}")?;
    writeln!(out, "{title}")?;
    writeln!(out, "{rule}")?;
    for line in lines {
        writeln!(out, "{line}")?;
    }
    writeln!(out)
}

pub fn welcome(out: &mut impl Write) -> io::Result<()> {
    banner(
        out,
        "tunefetch",
        &["Download YouTube playlists, channels and videos as MP3 files."],
    )
}

/// FFmpeg must be on `PATH` for the audio post-processors.
pub fn ffmpeg_notice(out: &mut impl Write) -> io::Result<()> {
    let install = if cfg!(target_os = "windows") {
        "Windows: download a build from https://ffmpeg.org and add its bin folder to PATH"
    } else if cfg!(target_os = "macos") {
        "macOS: brew install ffmpeg"
    } else {
        "Linux: sudo apt install ffmpeg | sudo dnf install ffmpeg | sudo pacman -S ffmpeg"
    };

    banner(
        out,
        "FFmpeg required",
        &[
            "FFmpeg converts downloads to MP3; without it every download fails.",
            install,
        ],
    )
}

pub fn url_help(out: &mut impl Write) -> io::Result<()> {
    banner(
        out,
        "Enter YouTube content",
        &[
            "Supported: playlist, video, channel and YouTube Music playlist URLs",
        ],
    )
}

pub fn settings(out: &mut impl Write, config: &Config) -> io::Result<()> {
    let proxy = config.proxy_url.as_deref().unwrap_or("None");
    writeln!(out, "Current settings")?;
    writeln!(out, "  Proxy:         {proxy}")?;
    writeln!(out, "  Output:        {}", config.output_directory.display())?;
    writeln!(out, "  Quality:       {}", config.audio_quality)?;
    writeln!(
        out,
        "  Progress bar:  {}",
        if config.display_progress_bar { "yes" } else { "no" }
    )?;
    writeln!(out)
}

/// Title, uploader, counts and the first few items of a collection.
pub fn collection_summary(out: &mut impl Write, collection: &CollectionInfo) -> io::Result<()> {
    writeln!(out, "Title:        {}", collection.title)?;
    writeln!(
        out,
        "Uploader:     {}",
        collection.uploader.as_deref().unwrap_or("Unknown")
    )?;
    writeln!(out, "Total videos: {}", collection.item_count)?;
    writeln!(out, "Duration:     {}", collection.formatted_duration())?;
    match collection.short_description(DESCRIPTION_WIDTH) {
        Some(description) => writeln!(out, "Description:  {description}")?,
        None => writeln!(out, "Description:  No description available")?,
    }

    if !collection.items.is_empty() {
        writeln!(out)?;
        writeln!(out, "Sample videos:")?;
        for (i, item) in collection.items.iter().take(SAMPLE_ITEMS).enumerate() {
            match item.duration.filter(|d| *d > 0) {
                Some(secs) => writeln!(
                    out,
                    "  {}. {} ({})",
                    i + 1,
                    item.title,
                    format_compact(Some(secs))
                )?,
                None => writeln!(out, "  {}. {}", i + 1, item.title)?,
            }
        }
        if collection.items.len() > SAMPLE_ITEMS {
            writeln!(
                out,
                "  ... and {} more videos",
                collection.items.len() - SAMPLE_ITEMS
            )?;
        }
    }

    writeln!(out)
}

pub fn starting(out: &mut impl Write, config: &Config, items: usize) -> io::Result<()> {
    banner(
        out,
        "Starting download",
        &[
            &format!("Destination: {}", config.output_directory.display()),
            &format!("Quality:     {}", config.audio_quality),
            &format!("Videos:      {items}"),
        ],
    )
}

pub fn success(out: &mut impl Write, output_dir: &Path, report: &TransferReport) -> io::Result<()> {
    let title = if report.is_partial() {
        format!("Download completed with {} skipped", report.skipped)
    } else {
        "Download complete".to_string()
    };

    banner(
        out,
        &title,
        &[
            &format!(
                "{} file(s), {:.1} MB saved to {}",
                report.downloaded(),
                report.total_size_mb(),
                output_dir.display()
            ),
        ],
    )
}

pub fn cancelled(out: &mut impl Write) -> io::Result<()> {
    banner(out, "Download cancelled", &["No files were downloaded."])
}

pub fn error(out: &mut impl Write, message: &str) -> io::Result<()> {
    banner(
        out,
        "Error",
        &[message, "Please check your connection and try again."],
    )
}

//! Maps a [`Config`] onto yt-dlp parameters.

use crate::config::Config;
use tunefetch_dl::audio::AudioPreset;
use tunefetch_dl::dl::{DownloadOptions, OutputTemplates};

/// Full parameter set for a transfer.
pub fn download_options(config: &Config) -> DownloadOptions {
    let preset = AudioPreset {
        quality: config.audio_quality,
        embed_thumbnail: config.embed_thumbnail,
        add_metadata: config.add_metadata,
    };

    let mut opts: DownloadOptions = preset.into();

    let template = config.output_directory.join(&config.output_filename_template);
    opts.outtmpl = Some(OutputTemplates::simple(template.to_string_lossy().into_owned()));
    opts.proxy = config.proxy_url.clone();

    if config.skip_downloaded {
        opts.download_archive = Some(config.archive_path().to_string_lossy().into_owned());
    }

    opts.playlist_items = playlist_range(config);
    opts.max_downloads = config.max_downloads;

    if config.sleep_interval_between_videos > 0 {
        opts.sleep_interval = Some(config.sleep_interval_between_videos);
    }

    opts.overwrites = Some(config.force_overwrites);
    opts.quiet = Some(!config.display_progress_bar);
    opts.noprogress = Some(!config.display_progress_bar);

    opts
}

/// Metadata-only parameter set: nothing is written and nothing is printed.
pub fn simulate_options(config: &Config) -> DownloadOptions {
    DownloadOptions {
        proxy: config.proxy_url.clone(),
        ..DownloadOptions::simulate()
    }
}

/// `"{start}:{end}"` with an open end, or `None` when no bound is set.
pub fn playlist_range(config: &Config) -> Option<String> {
    match (config.download_start_index, config.download_end_index) {
        (None, None) => None,
        (start, end) => Some(format!(
            "{}:{}",
            start.unwrap_or(1),
            end.map(|e| e.to_string()).unwrap_or_default()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use std::path::PathBuf;
    use tunefetch_dl::audio::AudioQuality;

    fn params(opts: &DownloadOptions) -> Value {
        serde_json::to_value(opts).unwrap()
    }

    #[test]
    fn open_ended_range() {
        let config = Config {
            download_start_index: Some(5),
            ..Default::default()
        };
        assert_eq!(playlist_range(&config).as_deref(), Some("5:"));

        let config = Config {
            download_end_index: Some(10),
            ..Default::default()
        };
        assert_eq!(playlist_range(&config).as_deref(), Some("1:10"));
    }

    #[test]
    fn no_range_key_without_bounds() {
        let value = params(&download_options(&Config::default()));
        assert!(value.get("playlist_items").is_none());
    }

    #[test]
    fn defaults_map_to_params() {
        let value = params(&download_options(&Config::default()));

        assert_eq!(
            value,
            json!({
                "format": "bestaudio/best",
                "outtmpl": {"default": PathBuf::from("downloaded_youtube_music")
                    .join("%(playlist_index)s - %(title)s.%(ext)s")
                    .to_string_lossy()},
                "postprocessors": [
                    {"key": "FFmpegExtractAudio", "preferredcodec": "mp3", "preferredquality": "320"},
                    {"key": "FFmpegMetadata"},
                ],
                "download_archive": PathBuf::from("downloaded_youtube_music")
                    .join("downloaded_archive.txt")
                    .to_string_lossy(),
                "overwrites": false,
                "ignoreerrors": true,
                "simulate": false,
                "quiet": false,
                "noprogress": false,
            })
        );
    }

    #[test]
    fn optional_settings_pass_through() {
        let config = Config {
            proxy_url: Some("socks5://proxy.local:1080".to_string()),
            audio_quality: AudioQuality::K128,
            skip_downloaded: false,
            max_downloads: Some(3),
            embed_thumbnail: true,
            add_metadata: false,
            sleep_interval_between_videos: 2,
            force_overwrites: true,
            display_progress_bar: false,
            ..Default::default()
        };

        let value = params(&download_options(&config));

        assert_eq!(value["proxy"], "socks5://proxy.local:1080");
        assert_eq!(value["max_downloads"], 3);
        assert_eq!(value["sleep_interval"], 2);
        assert_eq!(value["overwrites"], true);
        assert_eq!(value["quiet"], true);
        assert_eq!(value["noprogress"], true);
        assert_eq!(value["writethumbnail"], true);
        assert!(value.get("download_archive").is_none());
        assert_eq!(
            value["postprocessors"],
            json!([
                {"key": "FFmpegExtractAudio", "preferredcodec": "mp3", "preferredquality": "128"},
                {"key": "EmbedThumbnail", "already_have_thumbnail": false},
            ])
        );
    }

    #[test]
    fn simulate_keeps_only_proxy() {
        let config = Config {
            proxy_url: Some("http://proxy.local:3128".to_string()),
            max_downloads: Some(3),
            ..Default::default()
        };

        assert_eq!(
            params(&simulate_options(&config)),
            json!({
                "proxy": "http://proxy.local:3128",
                "simulate": true,
                "extract_flat": false,
                "quiet": true,
                "no_warnings": true,
            })
        );
    }
}

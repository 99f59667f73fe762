//! Items, collections and download records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use time::OffsetDateTime;

/// One video as reported by extraction.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemInfo {
    pub id: String,
    pub title: String,
    /// Length in seconds
    pub duration: Option<u64>,
    pub uploader: Option<String>,
    /// Upload date in UTC (YYYYMMDD)
    pub upload_date: Option<String>,
    pub url: String,
}

impl ItemInfo {
    /// Duration as `MM:SS` or `HH:MM:SS`.
    pub fn formatted_duration(&self) -> String {
        format_clock(self.duration)
    }

    /// Title with characters that are invalid in file names replaced by `_`.
    pub fn safe_filename(&self) -> String {
        safe_filename(&self.title)
    }
}

/// Playlist, channel listing, or a single video wrapped as a one-item collection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub id: String,
    pub title: String,
    pub uploader: Option<String>,
    pub description: Option<String>,
    pub item_count: usize,
    pub items: Vec<ItemInfo>,
    pub url: String,
}

impl CollectionInfo {
    /// Sum of item durations; unknown durations count as zero.
    pub fn total_duration(&self) -> u64 {
        self.items.iter().filter_map(|item| item.duration).sum()
    }

    /// Total duration as `"{h}h {m}m"` or `"{m}m"`.
    pub fn formatted_duration(&self) -> String {
        let total = self.total_duration();
        let hours = total / 3600;
        let minutes = (total % 3600) / 60;

        if hours > 0 {
            format!("{hours}h {minutes}m")
        } else {
            format!("{minutes}m")
        }
    }

    /// Items uploaded by `uploader`, in collection order.
    pub fn items_by_uploader<'a>(&'a self, uploader: &str) -> Vec<&'a ItemInfo> {
        self.items
            .iter()
            .filter(|item| item.uploader.as_deref() == Some(uploader))
            .collect()
    }

    /// Items grouped by uploader; items without one are keyed by `None`.
    pub fn group_by_uploader(&self) -> BTreeMap<Option<&str>, Vec<&ItemInfo>> {
        let mut groups: BTreeMap<Option<&str>, Vec<&ItemInfo>> = BTreeMap::new();
        for item in &self.items {
            groups
                .entry(item.uploader.as_deref())
                .or_default()
                .push(item);
        }
        groups
    }

    /// First line of the description, clipped to `max` characters.
    pub fn short_description(&self, max: usize) -> Option<String> {
        let first_line = self.description.as_deref()?.lines().next()?.trim();
        if first_line.is_empty() {
            return None;
        }

        if first_line.chars().count() > max {
            let clipped: String = first_line.chars().take(max).collect();
            Some(format!("{clipped}..."))
        } else {
            Some(first_line.to_string())
        }
    }
}

/// An item plus what happened to it on disk.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DownloadRecord {
    #[serde(flatten)]
    pub item: ItemInfo,
    pub downloaded: bool,
    pub file_path: Option<PathBuf>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub downloaded_at: Option<OffsetDateTime>,
    pub size_mb: Option<f64>,
}

impl DownloadRecord {
    pub fn new(item: ItemInfo) -> Self {
        Self {
            item,
            ..Default::default()
        }
    }

    /// Record a finished transfer. Only the first call has an effect.
    pub fn mark_downloaded(&mut self, file_path: PathBuf, size_mb: Option<f64>) -> bool {
        if self.downloaded {
            return false;
        }

        self.downloaded = true;
        self.file_path = Some(file_path);
        self.downloaded_at = Some(OffsetDateTime::now_utc());
        self.size_mb = size_mb;
        true
    }
}

/// Result of one transfer call.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransferReport {
    /// Items written to disk during this call
    pub records: Vec<DownloadRecord>,
    /// Entries yt-dlp skipped or failed while continuing past errors
    pub skipped: usize,
}

impl TransferReport {
    pub fn downloaded(&self) -> usize {
        self.records.iter().filter(|r| r.downloaded).count()
    }

    /// Whether some entries did not make it to disk.
    pub fn is_partial(&self) -> bool {
        self.skipped > 0
    }

    /// Total size of the written files in MB.
    pub fn total_size_mb(&self) -> f64 {
        self.records.iter().filter_map(|r| r.size_mb).sum()
    }
}

/// `MM:SS` or `HH:MM:SS`; `"Unknown"` for missing or zero.
pub fn format_clock(secs: Option<u64>) -> String {
    match secs {
        None | Some(0) => "Unknown".to_string(),
        Some(secs) => {
            let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
            if hours > 0 {
                format!("{hours:02}:{minutes:02}:{seconds:02}")
            } else {
                format!("{minutes:02}:{seconds:02}")
            }
        }
    }
}

/// `1h 2m 3s`, `2m 3s` or `3s`; `"Unknown"` for missing or zero.
pub fn format_compact(secs: Option<u64>) -> String {
    match secs {
        None | Some(0) => "Unknown".to_string(),
        Some(secs) => {
            let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
            if hours > 0 {
                format!("{hours}h {minutes}m {seconds}s")
            } else if minutes > 0 {
                format!("{minutes}m {seconds}s")
            } else {
                format!("{seconds}s")
            }
        }
    }
}

/// Replace `<>:"/\|?*` with `_` and trim.
pub fn safe_filename(title: &str) -> String {
    title
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, duration: Option<u64>, uploader: Option<&str>) -> ItemInfo {
        ItemInfo {
            id: id.to_string(),
            title: format!("Song {id}"),
            duration,
            uploader: uploader.map(str::to_string),
            upload_date: None,
            url: format!("https://www.youtube.com/watch?v={id}"),
        }
    }

    fn collection(items: Vec<ItemInfo>) -> CollectionInfo {
        CollectionInfo {
            id: "PL1234567890ABCDEF".to_string(),
            title: "Mix".to_string(),
            item_count: items.len(),
            items,
            ..Default::default()
        }
    }

    #[test]
    fn total_duration_treats_missing_as_zero() {
        let c = collection(vec![
            item("a", Some(200), None),
            item("b", None, None),
            item("c", Some(3500), None),
        ]);

        assert_eq!(c.total_duration(), 3700);
        assert_eq!(c.formatted_duration(), "1h 1m");
    }

    #[test]
    fn formatted_duration_under_an_hour() {
        let c = collection(vec![item("a", Some(125), None)]);
        assert_eq!(c.formatted_duration(), "2m");

        assert_eq!(collection(vec![]).formatted_duration(), "0m");
    }

    #[test]
    fn items_by_uploader_keeps_order() {
        let c = collection(vec![
            item("a", None, Some("jawed")),
            item("b", None, Some("other")),
            item("c", None, Some("jawed")),
        ]);

        let ids: Vec<_> = c
            .items_by_uploader("jawed")
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(ids, ["a", "c"]);
    }

    #[test]
    fn group_by_uploader() {
        let c = collection(vec![
            item("a", None, Some("jawed")),
            item("b", None, None),
            item("c", None, Some("jawed")),
        ]);

        let groups = c.group_by_uploader();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&Some("jawed")].len(), 2);
        assert_eq!(groups[&None].len(), 1);
    }

    #[test]
    fn short_description_clips_first_line() {
        let mut c = collection(vec![]);
        c.description = Some(format!("{}\nsecond line", "x".repeat(100)));
        assert_eq!(c.short_description(80), Some(format!("{}...", "x".repeat(80))));

        c.description = Some("Single video".to_string());
        assert_eq!(c.short_description(80).as_deref(), Some("Single video"));

        c.description = Some(String::new());
        assert_eq!(c.short_description(80), None);
    }

    #[test]
    fn mark_downloaded_only_once() {
        let mut record = DownloadRecord::new(item("a", Some(60), None));
        assert!(!record.downloaded);

        assert!(record.mark_downloaded(PathBuf::from("/music/a.mp3"), Some(1.5)));
        assert!(!record.mark_downloaded(PathBuf::from("/music/b.mp3"), Some(9.0)));

        assert!(record.downloaded);
        assert_eq!(record.file_path, Some(PathBuf::from("/music/a.mp3")));
        assert_eq!(record.size_mb, Some(1.5));
        assert!(record.downloaded_at.is_some());
    }

    #[test]
    fn record_serializes_flat() {
        let mut record = DownloadRecord::new(item("a", Some(60), None));
        record.mark_downloaded(PathBuf::from("/music/a.mp3"), None);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["id"], "a");
        assert_eq!(value["downloaded"], true);
        assert!(value["downloaded_at"].is_string());
    }

    #[test]
    fn transfer_report_counts() {
        let mut done = DownloadRecord::new(item("a", None, None));
        done.mark_downloaded(PathBuf::from("a.mp3"), Some(2.0));

        let report = TransferReport {
            records: vec![done, DownloadRecord::new(item("b", None, None))],
            skipped: 1,
        };

        assert_eq!(report.downloaded(), 1);
        assert!(report.is_partial());
        assert!((report.total_size_mb() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn clock_format() {
        assert_eq!(format_clock(None), "Unknown");
        assert_eq!(format_clock(Some(65)), "01:05");
        assert_eq!(format_clock(Some(3661)), "01:01:01");
    }

    #[test]
    fn compact_format() {
        assert_eq!(format_compact(Some(0)), "Unknown");
        assert_eq!(format_compact(Some(42)), "42s");
        assert_eq!(format_compact(Some(125)), "2m 5s");
        assert_eq!(format_compact(Some(3725)), "1h 2m 5s");
    }

    #[test]
    fn safe_filename_replaces_invalid_chars() {
        assert_eq!(safe_filename(" AC/DC: Live? "), "AC_DC_ Live_");
        assert_eq!(item("a", None, None).safe_filename(), "Song a");
    }
}

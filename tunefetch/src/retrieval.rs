//! Extraction and download orchestration over an [`Engine`].
//!
//! Engine failures never escape as `tunefetch_dl::Error`; they are mapped onto
//! [`RetrievalError`] so callers can decide how to report them.

use crate::config::Config;
use crate::models::{CollectionInfo, DownloadRecord, ItemInfo, TransferReport};
use crate::options;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tunefetch_dl::dl::Engine;
use tunefetch_dl::info::InfoDict;

const UNKNOWN_TITLE: &str = "Unknown";
const UNKNOWN_COLLECTION_TITLE: &str = "Unknown Playlist";
const SINGLE_ITEM_DESCRIPTION: &str = "Single video";

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("no information found for {url}")]
    NotFound { url: String },
    #[error("failed to extract information: {0}")]
    SiteExtraction(String),
    #[error("download failed: {0}")]
    Transfer(String),
    #[error("failed to create {path}: {source}")]
    Filesystem { path: PathBuf, source: io::Error },
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl RetrievalError {
    /// What the user can try next.
    pub fn hint(&self) -> &'static str {
        match self {
            RetrievalError::NotFound { .. } => "the video may be private, removed or region locked",
            RetrievalError::SiteExtraction(_) => "update yt-dlp with `pip install -U yt-dlp`",
            RetrievalError::Transfer(_) => "make sure FFmpeg is installed and on PATH",
            RetrievalError::Filesystem { .. } => "choose a writable output directory",
            RetrievalError::Unexpected(_) => "make sure the yt_dlp Python package is installed",
        }
    }
}

/// Extraction-then-download against a borrowed configuration.
pub struct Retriever<'a, E: Engine> {
    engine: E,
    config: &'a Config,
}

impl<'a, E: Engine> Retriever<'a, E> {
    pub fn new(engine: E, config: &'a Config) -> Self {
        Self { engine, config }
    }

    /// Metadata for a playlist, channel or single video, without downloading.
    pub fn extract_collection(&self, url: &str) -> Result<CollectionInfo, RetrievalError> {
        tracing::info!(url, "extracting collection info");

        let info = self.simulate(url)?;
        let collection = collection_from_info(info, url);

        tracing::info!(
            id = %collection.id,
            items = collection.item_count,
            "extraction complete"
        );

        Ok(collection)
    }

    /// Metadata for one video.
    pub fn extract_item(&self, url: &str) -> Result<ItemInfo, RetrievalError> {
        tracing::info!(url, "extracting item info");

        let info = self.simulate(url)?;
        Ok(item_from_info(&info))
    }

    /// Download everything the URL refers to into the output directory.
    pub fn download(&self, url: &str) -> Result<TransferReport, RetrievalError> {
        let output = &self.config.output_directory;
        fs::create_dir_all(output).map_err(|source| RetrievalError::Filesystem {
            path: output.clone(),
            source,
        })?;

        tracing::info!(url, output = ?output.display(), "starting download");

        let opts = options::download_options(self.config);
        let info = self
            .engine
            .extract_info(url, &opts, true)
            .map_err(|err| match err {
                tunefetch_dl::Error::Download(msg) => RetrievalError::Transfer(msg),
                other => RetrievalError::Unexpected(other.to_string()),
            })?
            .ok_or_else(|| RetrievalError::Transfer(format!("nothing was downloaded from {url}")))?;

        let report = report_from_info(&info);

        tracing::info!(
            downloaded = report.downloaded(),
            skipped = report.skipped,
            "download finished"
        );

        Ok(report)
    }

    fn simulate(&self, url: &str) -> Result<InfoDict, RetrievalError> {
        let opts = options::simulate_options(self.config);

        self.engine
            .extract_info(url, &opts, false)
            .map_err(|err| match err {
                tunefetch_dl::Error::Download(msg) => RetrievalError::SiteExtraction(msg),
                other => RetrievalError::Unexpected(other.to_string()),
            })?
            .ok_or_else(|| RetrievalError::NotFound {
                url: url.to_string(),
            })
    }
}

fn item_from_info(info: &InfoDict) -> ItemInfo {
    ItemInfo {
        id: info.id.clone().unwrap_or_default(),
        title: info
            .title
            .clone()
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
        duration: info.duration_secs(),
        uploader: info.uploader.clone(),
        upload_date: info.upload_date.clone(),
        url: info
            .webpage_url
            .clone()
            .or_else(|| info.url.clone())
            .unwrap_or_default(),
    }
}

fn collection_from_info(info: InfoDict, url: &str) -> CollectionInfo {
    match info.entries {
        Some(ref entries) => {
            let items: Vec<ItemInfo> = entries.iter().flatten().map(item_from_info).collect();

            CollectionInfo {
                id: info.id.clone().unwrap_or_default(),
                title: info
                    .title
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_COLLECTION_TITLE.to_string()),
                uploader: info.uploader.clone(),
                description: info.description.clone(),
                item_count: items.len(),
                items,
                url: url.to_string(),
            }
        }
        None => {
            let item = item_from_info(&info);

            CollectionInfo {
                id: item.id.clone(),
                title: item.title.clone(),
                uploader: item.uploader.clone(),
                description: Some(SINGLE_ITEM_DESCRIPTION.to_string()),
                item_count: 1,
                items: vec![item],
                url: url.to_string(),
            }
        }
    }
}

fn report_from_info(info: &InfoDict) -> TransferReport {
    let mut report = TransferReport::default();

    match &info.entries {
        Some(entries) => {
            for entry in entries {
                match entry.as_ref().and_then(record_from_info) {
                    Some(record) => report.records.push(record),
                    None => report.skipped += 1,
                }
            }
        }
        None => match record_from_info(info) {
            Some(record) => report.records.push(record),
            None => report.skipped += 1,
        },
    }

    report
}

/// A record for an entry yt-dlp actually wrote; archived entries have no file.
fn record_from_info(info: &InfoDict) -> Option<DownloadRecord> {
    let path = info.downloaded_path()?;
    let mut record = DownloadRecord::new(item_from_info(info));
    record.mark_downloaded(path.to_path_buf(), file_size_mb(path));

    tracing::debug!(id = %record.item.id, path = ?path.display(), "item downloaded");

    Some(record)
}

fn file_size_mb(path: &Path) -> Option<f64> {
    fs::metadata(path)
        .ok()
        .map(|meta| meta.len() as f64 / (1024.0 * 1024.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use tunefetch_dl::dl::DownloadOptions;

    /// Canned engine: returns `response` and remembers every call.
    struct FakeEngine {
        response: fn() -> tunefetch_dl::Result<Option<InfoDict>>,
        calls: RefCell<Vec<(String, DownloadOptions, bool)>>,
    }

    impl FakeEngine {
        fn new(response: fn() -> tunefetch_dl::Result<Option<InfoDict>>) -> Self {
            Self {
                response,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl Engine for &FakeEngine {
        fn extract_info(
            &self,
            url: &str,
            opts: &DownloadOptions,
            download: bool,
        ) -> tunefetch_dl::Result<Option<InfoDict>> {
            self.calls
                .borrow_mut()
                .push((url.to_string(), opts.clone(), download));
            (self.response)()
        }
    }

    fn info(value: serde_json::Value) -> InfoDict {
        serde_json::from_value(value).unwrap()
    }

    fn single_video() -> tunefetch_dl::Result<Option<InfoDict>> {
        Ok(Some(info(json!({
            "id": "jNQXAC9IVRw",
            "title": "Me at the zoo",
            "uploader": "jawed",
            "duration": 19.0,
            "webpage_url": "https://www.youtube.com/watch?v=jNQXAC9IVRw",
        }))))
    }

    fn playlist() -> tunefetch_dl::Result<Option<InfoDict>> {
        Ok(Some(info(json!({
            "id": "PL1234567890ABCDEF",
            "uploader": "Someone",
            "entries": [
                {"id": "aaaaaaaaaaa", "title": "First", "url": "https://youtu.be/aaaaaaaaaaa"},
                null,
                {"id": "bbbbbbbbbbb", "duration": 200.4,
                 "webpage_url": "https://www.youtube.com/watch?v=bbbbbbbbbbb",
                 "url": "https://rr1.googlevideo.com/media"},
            ],
        }))))
    }

    fn download_error() -> tunefetch_dl::Result<Option<InfoDict>> {
        Err(tunefetch_dl::Error::Download(
            "ERROR: [youtube] xxxxxxxxxxx: Video unavailable".to_string(),
        ))
    }

    fn bridge_error() -> tunefetch_dl::Result<Option<InfoDict>> {
        let err = serde_json::from_str::<InfoDict>("{").unwrap_err();
        Err(tunefetch_dl::Error::Json(err))
    }

    fn nothing() -> tunefetch_dl::Result<Option<InfoDict>> {
        Ok(None)
    }

    #[test]
    fn single_video_becomes_one_item_collection() {
        let engine = FakeEngine::new(single_video);
        let config = Config::default();
        let retriever = Retriever::new(&engine, &config);

        let collection = retriever
            .extract_collection("https://youtu.be/jNQXAC9IVRw")
            .unwrap();

        assert_eq!(collection.item_count, 1);
        assert_eq!(collection.description.as_deref(), Some("Single video"));
        assert_eq!(collection.title, "Me at the zoo");
        assert_eq!(collection.items[0].duration, Some(19));
        assert_eq!(collection.url, "https://youtu.be/jNQXAC9IVRw");
    }

    #[test]
    fn playlist_entries_map_to_items() {
        let engine = FakeEngine::new(playlist);
        let config = Config::default();
        let retriever = Retriever::new(&engine, &config);

        let collection = retriever
            .extract_collection("https://www.youtube.com/playlist?list=PL1234567890ABCDEF")
            .unwrap();

        assert_eq!(collection.title, "Unknown Playlist");
        assert_eq!(collection.item_count, 2);
        assert_eq!(collection.items[0].url, "https://youtu.be/aaaaaaaaaaa");
        assert_eq!(collection.items[1].title, "Unknown");
        assert_eq!(
            collection.items[1].url,
            "https://www.youtube.com/watch?v=bbbbbbbbbbb"
        );
        assert_eq!(collection.items[1].duration, Some(200));
    }

    #[test]
    fn extraction_runs_in_simulate_mode() {
        let engine = FakeEngine::new(single_video);
        let config = Config {
            proxy_url: Some("socks5://proxy.local:1080".to_string()),
            ..Default::default()
        };

        Retriever::new(&engine, &config)
            .extract_item("https://youtu.be/jNQXAC9IVRw")
            .unwrap();

        let calls = engine.calls.borrow();
        let (_, opts, download) = &calls[0];
        assert!(!download);
        assert_eq!(opts.simulate, Some(true));
        assert_eq!(opts.proxy.as_deref(), Some("socks5://proxy.local:1080"));
    }

    #[test]
    fn download_error_is_site_extraction() {
        let engine = FakeEngine::new(download_error);
        let config = Config::default();

        let err = Retriever::new(&engine, &config)
            .extract_collection("https://www.youtube.com/watch?v=xxxxxxxxxxx")
            .unwrap_err();

        assert!(matches!(err, RetrievalError::SiteExtraction(msg) if msg.contains("unavailable")));
    }

    #[test]
    fn other_engine_error_is_unexpected() {
        let engine = FakeEngine::new(bridge_error);
        let config = Config::default();

        let err = Retriever::new(&engine, &config)
            .extract_item("https://youtu.be/jNQXAC9IVRw")
            .unwrap_err();

        assert!(matches!(err, RetrievalError::Unexpected(_)));
    }

    #[test]
    fn missing_info_is_not_found() {
        let engine = FakeEngine::new(nothing);
        let config = Config::default();

        let err = Retriever::new(&engine, &config)
            .extract_collection("https://youtu.be/jNQXAC9IVRw")
            .unwrap_err();

        assert!(matches!(err, RetrievalError::NotFound { .. }));
    }

    #[test]
    fn download_creates_output_and_counts_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FakeEngine::new(playlist);
        let config = Config {
            output_directory: dir.path().join("music"),
            ..Default::default()
        };

        let report = Retriever::new(&engine, &config)
            .download("https://www.youtube.com/playlist?list=PL1234567890ABCDEF")
            .unwrap();

        assert!(config.output_directory.is_dir());
        // entries without a written file count as skipped, as does the null one
        assert_eq!(report.records.len(), 0);
        assert_eq!(report.skipped, 3);

        let calls = engine.calls.borrow();
        assert!(calls[0].2);
        assert_eq!(calls[0].1.simulate, Some(false));
    }

    #[test]
    fn download_records_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("01 - Me at the zoo.mp3");
        fs::write(&file, vec![0u8; 1024 * 1024]).unwrap();

        struct WritesFile(PathBuf);

        impl Engine for WritesFile {
            fn extract_info(
                &self,
                _url: &str,
                _opts: &DownloadOptions,
                _download: bool,
            ) -> tunefetch_dl::Result<Option<InfoDict>> {
                Ok(Some(info(json!({
                    "id": "jNQXAC9IVRw",
                    "title": "Me at the zoo",
                    "requested_downloads": [{"filepath": self.0, "ext": "mp3"}],
                }))))
            }
        }

        let config = Config {
            output_directory: dir.path().to_path_buf(),
            ..Default::default()
        };

        let report = Retriever::new(WritesFile(file.clone()), &config)
            .download("https://youtu.be/jNQXAC9IVRw")
            .unwrap();

        assert_eq!(report.downloaded(), 1);
        assert!(!report.is_partial());
        let record = &report.records[0];
        assert_eq!(record.file_path.as_deref(), Some(file.as_path()));
        assert_eq!(record.size_mb, Some(1.0));
    }

    #[test]
    fn download_error_is_transfer() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FakeEngine::new(download_error);
        let config = Config {
            output_directory: dir.path().to_path_buf(),
            ..Default::default()
        };

        let err = Retriever::new(&engine, &config)
            .download("https://www.youtube.com/watch?v=xxxxxxxxxxx")
            .unwrap_err();

        assert!(matches!(err, RetrievalError::Transfer(_)));
    }

    #[test]
    fn download_without_info_is_transfer() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FakeEngine::new(nothing);
        let config = Config {
            output_directory: dir.path().to_path_buf(),
            ..Default::default()
        };

        let err = Retriever::new(&engine, &config)
            .download("https://youtu.be/jNQXAC9IVRw")
            .unwrap_err();

        assert!(matches!(err, RetrievalError::Transfer(_)));
    }

    #[test]
    fn unwritable_output_is_filesystem_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "").unwrap();

        let engine = FakeEngine::new(single_video);
        let config = Config {
            output_directory: blocker.join("music"),
            ..Default::default()
        };

        let err = Retriever::new(&engine, &config)
            .download("https://youtu.be/jNQXAC9IVRw")
            .unwrap_err();

        assert!(matches!(err, RetrievalError::Filesystem { .. }));
        assert!(engine.calls.borrow().is_empty());
    }
}

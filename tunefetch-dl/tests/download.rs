//! Audio preset download integration tests.
//!
//! Tests: metadata extraction, MP3 download, archive file bookkeeping,
//! DownloadError classification.
//!
//! Uses "Me at the zoo" (jNQXAC9IVRw) - predictable metadata.

use eyre::{Context, OptionExt, Result, ensure};
use std::path::PathBuf;
use std::sync::LazyLock;
use tempfile::TempDir;
use tunefetch_dl::audio::{AudioPreset, AudioQuality};
use tunefetch_dl::dl::{DownloadOptions, Engine, OutputTemplates, YtDlp};
use tunefetch_dl::info::InfoDict;

const TEST_URL: &str = "https://youtu.be/jNQXAC9IVRw";
const TEST_UPLOADER: &str = "jawed";
const TEST_ID: &str = "jNQXAC9IVRw";
const TEST_TITLE: &str = "Me at the zoo";

struct TestContext {
    _temp_dir: TempDir,
    archive: PathBuf,
    file_path: PathBuf,
    info: InfoDict,
}

static TEST_CONTEXT: LazyLock<Result<TestContext>> = LazyLock::new(|| {
    let temp_dir = tempfile::tempdir()?;
    let archive = temp_dir.path().join("downloaded_archive.txt");

    let mut opts: DownloadOptions = AudioPreset::new(AudioQuality::K128).into();
    opts.outtmpl = Some(OutputTemplates::simple(
        temp_dir
            .path()
            .join("%(id)s.%(ext)s")
            .to_string_lossy()
            .to_string(),
    ));
    opts.download_archive = Some(archive.to_string_lossy().to_string());
    opts.quiet = Some(true);

    let info = YtDlp
        .extract_info(TEST_URL, &opts, true)
        .context("yt-dlp download failed for audio preset")?
        .ok_or_eyre("yt-dlp returned no info dict")?;

    let file_path = info
        .downloaded_path()
        .map(PathBuf::from)
        .ok_or_eyre("download did not report a file path")?;

    ensure!(
        file_path.exists(),
        "downloaded file not found at: {:?}",
        file_path.display()
    );

    Ok(TestContext {
        _temp_dir: temp_dir,
        archive,
        file_path,
        info,
    })
});

#[track_caller]
fn get_test_context() -> &'static TestContext {
    TEST_CONTEXT.as_ref().expect("download failed")
}

#[test]
#[ignore = "network I/O"]
fn mp3_file_exist() {
    let ctx = get_test_context();

    assert_eq!(
        ctx.file_path.extension().and_then(|e| e.to_str()),
        Some("mp3"),
        "unexpected file: {:?}",
        ctx.file_path.display()
    );
}

#[test]
#[ignore = "network I/O"]
fn archive_records_id() {
    let ctx = get_test_context();

    let archive = std::fs::read_to_string(&ctx.archive).expect("archive file missing");
    assert!(
        archive.lines().any(|line| line.ends_with(TEST_ID)),
        "archive does not mention {TEST_ID}: {archive:?}"
    );
}

#[test]
#[ignore = "network I/O"]
fn info_dict_fields() {
    let ctx = get_test_context();

    match &ctx.info {
        InfoDict {
            id: Some(id),
            title: Some(title),
            uploader: Some(uploader),
            entries: None,
            ..
        } if id == TEST_ID && title == TEST_TITLE && uploader == TEST_UPLOADER => {}
        other => panic!("unexpected info dict: {other:?}"),
    }
}

#[test]
#[ignore = "network I/O"]
fn simulate_writes_nothing() {
    let info = YtDlp
        .extract_info(TEST_URL, &DownloadOptions::simulate(), false)
        .expect("extraction failed")
        .expect("no info dict");

    assert_eq!(info.id.as_deref(), Some(TEST_ID));
    assert_eq!(info.downloaded_path(), None);
}

#[test]
#[ignore = "network I/O"]
fn unavailable_video_is_download_error() {
    let err = YtDlp
        .extract_info(
            "https://www.youtube.com/watch?v=xxxxxxxxxxx",
            &DownloadOptions::simulate(),
            false,
        )
        .expect_err("extraction should fail");

    assert!(err.is_download_error(), "unexpected error: {err:?}");
}

//! End-to-end pipeline runs against stand-in yt-dlp and ffmpeg scripts
#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use ytmp3_core::config::PathsConfig;
use ytmp3_core::error::{ConvertError, FetchError};
use ytmp3_core::{Outcome, Pipeline, PipelineConfig, PipelineStage, Quality, Ytmp3Error};

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// yt-dlp stand-in that logs its arguments to `<bin>/yt-dlp.log`,
/// "downloads" `saved` and prints its info JSON
fn fake_yt_dlp(bin: &Path, saved: &Path) -> PathBuf {
    let json = format!(
        r#"{{"id":"abc123","title":"Song","ext":"{}","_filename":"{}"}}"#,
        saved.extension().unwrap().to_string_lossy(),
        saved.display()
    );
    let body = format!(
        "printf '%s\\n' \"$@\" > '{log}'\nmkdir -p '{dir}'\nprintf 'audio' > '{file}'\nprintf '%s\\n' '{json}'",
        log = bin.join("yt-dlp.log").display(),
        dir = saved.parent().unwrap().display(),
        file = saved.display(),
    );
    write_script(bin, "yt-dlp", &body)
}

/// ffmpeg stand-in that logs its arguments and copies input to output
fn fake_ffmpeg_ok(bin: &Path, log: &Path) -> PathBuf {
    let body = format!("printf '%s\\n' \"$@\" > '{}'\ncp \"$2\" \"$3\"", log.display());
    write_script(bin, "ffmpeg", &body)
}

fn fake_ffmpeg_failing(bin: &Path) -> PathBuf {
    write_script(
        bin,
        "ffmpeg",
        "echo 'Invalid data found when processing input' >&2\nexit 1",
    )
}

fn logged_args(log: &Path) -> Vec<String> {
    std::fs::read_to_string(log)
        .unwrap()
        .lines()
        .map(String::from)
        .collect()
}

fn config(out: &Path, yt_dlp: PathBuf, ffmpeg: Option<PathBuf>) -> PipelineConfig {
    PipelineConfig {
        url: "https://www.youtube.com/watch?v=abc123".to_string(),
        output_dir: out.to_path_buf(),
        quality: Quality::Best,
        verify_output: true,
        paths: PathsConfig {
            yt_dlp: Some(yt_dlp),
            ffmpeg,
        },
    }
}

async fn run(config: PipelineConfig) -> (Result<Outcome, Ytmp3Error>, Vec<PipelineStage>) {
    let (tx, mut rx) = mpsc::channel(32);
    let pipeline = Pipeline::new(config, tx);
    let result = pipeline.run().await;
    drop(pipeline);

    let mut stages = Vec::new();
    while let Some(stage) = rx.recv().await {
        stages.push(stage);
    }
    (result, stages)
}

#[tokio::test]
async fn test_webm_is_converted_and_removed() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("out");
    let webm = out.join("Song.webm");
    let log = tmp.path().join("ffmpeg.log");

    let yt_dlp = fake_yt_dlp(tmp.path(), &webm);
    let ffmpeg = fake_ffmpeg_ok(tmp.path(), &log);

    let (result, stages) = run(config(&out, yt_dlp, Some(ffmpeg))).await;

    let mp3 = out.join("Song.mp3");
    assert_eq!(
        result.unwrap(),
        Outcome::Converted {
            source: webm.clone(),
            output: mp3.clone(),
        }
    );
    assert!(!webm.exists());
    assert!(mp3.exists());

    assert_eq!(
        logged_args(&log),
        [
            "-i".to_string(),
            webm.display().to_string(),
            mp3.display().to_string()
        ]
    );

    // The CLI prints the download line from this stage, not from the log
    assert!(stages
        .iter()
        .any(|s| matches!(s, PipelineStage::Fetched { path, .. } if *path == webm)));
    assert!(stages
        .iter()
        .any(|s| matches!(s, PipelineStage::Converting { .. })));
    assert!(matches!(stages.last(), Some(PipelineStage::Complete { .. })));
}

async fn assert_yt_dlp_args(quality: Quality, selector: &str) {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("out");
    let mp3 = out.join("Song.mp3");

    let yt_dlp = fake_yt_dlp(tmp.path(), &mp3);
    let mut config = config(&out, yt_dlp, None);
    config.quality = quality;
    let url = config.url.clone();

    let (result, _) = run(config).await;
    assert_eq!(result.unwrap(), Outcome::AlreadyMp3(mp3));

    assert_eq!(
        logged_args(&tmp.path().join("yt-dlp.log")),
        [
            "-f".to_string(),
            selector.to_string(),
            "-o".to_string(),
            out.join("%(title)s.%(ext)s").display().to_string(),
            "--no-playlist".to_string(),
            "--no-cache-dir".to_string(),
            "--print-json".to_string(),
            url,
        ]
    );
}

#[tokio::test]
async fn test_yt_dlp_receives_prefer_320_policy() {
    assert_yt_dlp_args(Quality::Prefer320, "bestaudio[abr>=320]/bestaudio/best").await;
}

#[tokio::test]
async fn test_yt_dlp_receives_best_policy() {
    assert_yt_dlp_args(Quality::Best, "bestaudio/best").await;
}

#[tokio::test]
async fn test_mp3_download_skips_conversion() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("out");
    let mp3 = out.join("Song.mp3");

    let yt_dlp = fake_yt_dlp(tmp.path(), &mp3);
    // An encoder that would fail loudly if it were ever invoked
    let ffmpeg = fake_ffmpeg_failing(tmp.path());

    let (result, stages) = run(config(&out, yt_dlp, Some(ffmpeg))).await;

    assert_eq!(result.unwrap(), Outcome::AlreadyMp3(mp3.clone()));
    assert!(mp3.exists());
    assert!(!stages
        .iter()
        .any(|s| matches!(s, PipelineStage::Converting { .. })));
}

#[tokio::test]
async fn test_encoder_failure_keeps_source() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("out");
    let webm = out.join("Song.webm");

    let yt_dlp = fake_yt_dlp(tmp.path(), &webm);
    let ffmpeg = fake_ffmpeg_failing(tmp.path());

    let (result, stages) = run(config(&out, yt_dlp, Some(ffmpeg))).await;

    match result {
        Err(Ytmp3Error::Convert(ConvertError::EncoderFailed { code, stderr })) => {
            assert_eq!(code, Some(1));
            assert!(stderr.contains("Invalid data"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(webm.exists());
    assert!(matches!(
        stages.last(),
        Some(PipelineStage::Failed { stage, .. }) if stage == "convert"
    ));
}

#[tokio::test]
async fn test_empty_encoder_output_keeps_source() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("out");
    let webm = out.join("Song.webm");

    let yt_dlp = fake_yt_dlp(tmp.path(), &webm);
    let ffmpeg = write_script(tmp.path(), "ffmpeg", ": > \"$3\"");

    let (result, _) = run(config(&out, yt_dlp, Some(ffmpeg))).await;

    assert!(matches!(
        result,
        Err(Ytmp3Error::Convert(ConvertError::EmptyOutput(_)))
    ));
    assert!(webm.exists());
}

#[tokio::test]
async fn test_unsupported_container_is_left_in_place() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("out");
    let m4a = out.join("Song.m4a");

    let yt_dlp = fake_yt_dlp(tmp.path(), &m4a);
    let ffmpeg = fake_ffmpeg_failing(tmp.path());

    let (result, stages) = run(config(&out, yt_dlp, Some(ffmpeg))).await;

    assert_eq!(result.unwrap(), Outcome::Unsupported(m4a.clone()));
    assert!(m4a.exists());
    assert!(matches!(
        stages.last(),
        Some(PipelineStage::Unsupported { .. })
    ));
}

#[tokio::test]
async fn test_extraction_error_is_returned() {
    let tmp = tempfile::tempdir().unwrap();
    let yt_dlp = write_script(
        tmp.path(),
        "yt-dlp",
        "echo 'ERROR: [youtube] abc123: Video unavailable' >&2\nexit 1",
    );

    let (result, _) = run(config(tmp.path(), yt_dlp, None)).await;

    assert!(matches!(
        result,
        Err(Ytmp3Error::Fetch(FetchError::VideoUnavailable(_)))
    ));
}

#[tokio::test]
async fn test_no_metadata_is_reported() {
    let tmp = tempfile::tempdir().unwrap();
    let yt_dlp = write_script(tmp.path(), "yt-dlp", "exit 0");

    let (result, _) = run(config(tmp.path(), yt_dlp, None)).await;

    match result {
        Err(Ytmp3Error::Fetch(err @ FetchError::NoMetadata(_))) => {
            assert!(err.to_string().starts_with("Could not get info for"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_yt_dlp_binary() {
    let tmp = tempfile::tempdir().unwrap();
    let missing = tmp.path().join("no-such-yt-dlp");

    let (result, _) = run(config(tmp.path(), missing, None)).await;

    assert!(matches!(
        result,
        Err(Ytmp3Error::Fetch(FetchError::YtDlpNotFound))
    ));
}

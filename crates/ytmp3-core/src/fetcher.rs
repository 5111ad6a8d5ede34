//! Audio fetcher using yt-dlp

use crate::error::FetchError;
use crate::policy::FormatPolicy;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

#[derive(Debug)]
pub struct Fetcher {
    yt_dlp_path: PathBuf,
}

#[derive(Debug)]
pub struct FetchResult {
    pub audio_path: PathBuf,
    pub metadata: VideoMetadata,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoMetadata {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub ext: String,
    /// Final path as computed by yt-dlp from the output template
    #[serde(default, rename = "_filename")]
    pub filename: Option<PathBuf>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
}

/// Container of a downloaded file, judged by extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SavedFormat {
    Mp3,
    Webm,
    Other(String),
}

impl SavedFormat {
    pub fn of(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "mp3" => SavedFormat::Mp3,
            "webm" => SavedFormat::Webm,
            _ => SavedFormat::Other(ext),
        }
    }
}

impl Fetcher {
    pub fn new(yt_dlp_path: PathBuf) -> Self {
        Self { yt_dlp_path }
    }

    /// Download the stream selected by `policy` and report where it landed
    pub async fn fetch(&self, url: &str, policy: &FormatPolicy) -> Result<FetchResult, FetchError> {
        info!("Downloading audio from: {}", url);
        debug!("Format selector: {}", policy.format_selector);

        let output = Command::new(&self.yt_dlp_path)
            .args(policy.to_args())
            // Download and print the info JSON to stdout
            .arg("--print-json")
            .arg(url)
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => FetchError::YtDlpNotFound,
                _ => FetchError::Io(e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("yt-dlp stderr: {}", stderr);
            return Err(classify_failure(url, output.status.code(), &stderr));
        }

        // One JSON object per line; the last one describes the saved file
        let stdout = String::from_utf8_lossy(&output.stdout);
        let json = stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .last()
            .ok_or_else(|| FetchError::NoMetadata(url.to_string()))?;

        let metadata: VideoMetadata =
            serde_json::from_str(json).map_err(|e| FetchError::MetadataParse(e.to_string()))?;

        let audio_path = saved_path(&metadata, policy);
        debug!("Downloaded: {} ({})", metadata.title, metadata.id);

        Ok(FetchResult {
            audio_path,
            metadata,
        })
    }
}

/// Path yt-dlp saved to, falling back to the template when it did not say
fn saved_path(metadata: &VideoMetadata, policy: &FormatPolicy) -> PathBuf {
    if let Some(ref filename) = metadata.filename {
        return filename.clone();
    }

    let dir = policy
        .output_template
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    dir.join(format!("{}.{}", sanitize_filename(&metadata.title), metadata.ext))
}

fn classify_failure(url: &str, code: Option<i32>, stderr: &str) -> FetchError {
    const UNAVAILABLE: [&str; 4] = [
        "Video unavailable",
        "Private video",
        "not available in your country",
        "Sign in to confirm your age",
    ];

    if UNAVAILABLE.iter().any(|m| stderr.contains(m)) {
        return FetchError::VideoUnavailable(url.to_string());
    }
    if stderr.contains("Unsupported URL") || stderr.contains("is not a valid URL") {
        return FetchError::UnsupportedUrl(url.to_string());
    }

    FetchError::Acquisition {
        code,
        reason: error_reason(stderr),
    }
}

/// Last `ERROR:` line of yt-dlp output, or the whole trimmed output
fn error_reason(stderr: &str) -> String {
    last_error_line(stderr).unwrap_or_else(|| stderr.trim().to_string())
}

fn last_error_line(stderr: &str) -> Option<String> {
    let re = Regex::new(r"(?m)^ERROR:\s*(.+)$").ok()?;
    let caps = re.captures_iter(stderr).last()?;
    Some(caps.get(1)?.as_str().trim().to_string())
}

/// Sanitize a title the way yt-dlp does by default, swapping reserved
/// characters for their full-width look-alikes.
///
/// Only used when yt-dlp omits `_filename`, so the result is best effort:
/// yt-dlp has further rules (leading dots, control characters, length
/// limits) that are not mirrored here.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' => '⧸',
            '\\' => '⧹',
            ':' => '：',
            '*' => '＊',
            '?' => '？',
            '"' => '＂',
            '<' => '＜',
            '>' => '＞',
            '|' => '｜',
            _ => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

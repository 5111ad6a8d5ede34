//! Error types for ytmp3-core

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Ytmp3Error>;

#[derive(Error, Debug)]
pub enum Ytmp3Error {
    #[error("Download failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Conversion failed: {0}")]
    Convert(#[from] ConvertError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("yt-dlp not found. Install with: pip install yt-dlp")]
    YtDlpNotFound,

    #[error("Video unavailable or restricted: {0}")]
    VideoUnavailable(String),

    #[error("Unsupported URL: {0}")]
    UnsupportedUrl(String),

    #[error("yt-dlp failed with exit code {code:?}: {reason}")]
    Acquisition { code: Option<i32>, reason: String },

    #[error("Could not get info for {0}")]
    NoMetadata(String),

    #[error("Failed to parse metadata: {0}")]
    MetadataParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("ffmpeg not found. Please ensure ffmpeg is installed and in your PATH")]
    EncoderNotFound,

    #[error("ffmpeg exited with code {code:?}: {stderr}")]
    EncoderFailed { code: Option<i32>, stderr: String },

    #[error("ffmpeg reported success but produced no output at {}", .0.display())]
    EmptyOutput(PathBuf),

    #[error("Input has no file name: {}", .0.display())]
    InvalidInput(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    LoadError(String),

    #[error("Failed to render config: {0}")]
    Render(String),
}

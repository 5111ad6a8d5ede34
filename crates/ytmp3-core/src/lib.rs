//! ytmp3-core: fetch video audio with yt-dlp and convert it to MP3 with FFmpeg

pub mod config;
pub mod converter;
pub mod error;
pub mod fetcher;
pub mod pipeline;
pub mod policy;

pub use config::Config;
pub use error::{Result, Ytmp3Error};
pub use pipeline::{Outcome, Pipeline, PipelineConfig, PipelineStage};
pub use policy::{FormatPolicy, Quality};

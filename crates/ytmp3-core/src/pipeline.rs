//! Pipeline orchestration: fetch, classify, convert

use crate::config::{resolve_tool, PathsConfig};
use crate::converter::Converter;
use crate::error::{ConvertError, FetchError, Ytmp3Error};
use crate::fetcher::{Fetcher, SavedFormat};
use crate::policy::{FormatPolicy, Quality};

use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub url: String,
    pub output_dir: PathBuf,
    pub quality: Quality,
    pub verify_output: bool,
    pub paths: PathsConfig,
}

/// Pipeline progress stages
#[derive(Debug, Clone)]
pub enum PipelineStage {
    Fetching { url: String },
    Fetched { path: PathBuf, title: String },
    Converting { from: PathBuf },
    Complete { output: PathBuf, duration: Duration },
    Unsupported { path: PathBuf },
    Failed { stage: String, error: String },
}

/// Result of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// yt-dlp already delivered an MP3
    AlreadyMp3(PathBuf),
    /// A WebM download was converted and removed
    Converted { source: PathBuf, output: PathBuf },
    /// Neither MP3 nor WebM; the download is left where it is
    Unsupported(PathBuf),
}

impl Outcome {
    /// The file the user ends up with
    pub fn path(&self) -> &PathBuf {
        match self {
            Outcome::AlreadyMp3(path) | Outcome::Unsupported(path) => path,
            Outcome::Converted { output, .. } => output,
        }
    }
}

/// Main processing pipeline
pub struct Pipeline {
    config: PipelineConfig,
    progress_tx: mpsc::Sender<PipelineStage>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, progress_tx: mpsc::Sender<PipelineStage>) -> Self {
        Self { config, progress_tx }
    }

    pub async fn run(&self) -> Result<Outcome, Ytmp3Error> {
        let start_time = Instant::now();
        info!("Starting pipeline for: {}", self.config.url);

        // 1. Fetch
        self.report(PipelineStage::Fetching {
            url: self.config.url.clone(),
        })
        .await;

        let yt_dlp_path = resolve_tool(self.config.paths.yt_dlp.as_deref(), "yt-dlp")
            .ok_or(FetchError::YtDlpNotFound)
            .map_err(|e| self.fail("fetch", e))?;

        let policy = FormatPolicy::new(self.config.quality, &self.config.output_dir);
        let fetched = Fetcher::new(yt_dlp_path)
            .fetch(&self.config.url, &policy)
            .await
            .map_err(|e| self.fail("fetch", e))?;

        debug!("Successfully downloaded: {}", fetched.audio_path.display());
        self.report(PipelineStage::Fetched {
            path: fetched.audio_path.clone(),
            title: fetched.metadata.title.clone(),
        })
        .await;

        // 2. Classify, 3. convert when needed
        let outcome = match SavedFormat::of(&fetched.audio_path) {
            SavedFormat::Mp3 => Outcome::AlreadyMp3(fetched.audio_path),
            SavedFormat::Webm => {
                self.report(PipelineStage::Converting {
                    from: fetched.audio_path.clone(),
                })
                .await;

                let ffmpeg_path = resolve_tool(self.config.paths.ffmpeg.as_deref(), "ffmpeg")
                    .ok_or(ConvertError::EncoderNotFound)
                    .map_err(|e| self.fail("convert", e))?;

                let output = Converter::new(ffmpeg_path)
                    .verify_output(self.config.verify_output)
                    .convert(&fetched.audio_path, &self.config.output_dir)
                    .await
                    .map_err(|e| self.fail("convert", e))?;

                info!("Converted to MP3: {}", output.display());
                Outcome::Converted {
                    source: fetched.audio_path,
                    output,
                }
            }
            SavedFormat::Other(ext) => {
                warn!("Downloaded audio is .{}, not mp3 or webm", ext);
                self.report(PipelineStage::Unsupported {
                    path: fetched.audio_path.clone(),
                })
                .await;
                return Ok(Outcome::Unsupported(fetched.audio_path));
            }
        };

        let duration = start_time.elapsed();
        info!(
            "Pipeline complete: {} ({:.1}s)",
            outcome.path().display(),
            duration.as_secs_f32()
        );

        self.report(PipelineStage::Complete {
            output: outcome.path().clone(),
            duration,
        })
        .await;

        Ok(outcome)
    }

    async fn report(&self, stage: PipelineStage) {
        // A closed receiver only means nobody is watching
        let _ = self.progress_tx.send(stage).await;
    }

    fn fail<E: Into<Ytmp3Error>>(&self, stage: &str, error: E) -> Ytmp3Error {
        let error = error.into();
        let _ = self.progress_tx.try_send(PipelineStage::Failed {
            stage: stage.to_string(),
            error: error.to_string(),
        });
        error
    }
}

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

use crate::args::FetchOptions;
use crate::prompt::Answers;
use ytmp3_core::{
    config::Config,
    pipeline::{Outcome, Pipeline, PipelineConfig, PipelineStage},
    policy::Quality,
};

/// What the user asked for; unset fields fall back to the config file
#[derive(Debug)]
pub struct Request {
    pub url: String,
    pub output_dir: Option<PathBuf>,
    pub quality: Option<Quality>,
    pub verify_output: bool,
}

impl Request {
    pub fn from_options(url: String, options: &FetchOptions) -> Self {
        Self {
            url,
            output_dir: options.output.clone(),
            quality: options.prefer_320.then_some(Quality::Prefer320),
            verify_output: !options.no_verify,
        }
    }

    pub fn from_answers(answers: Answers, options: &FetchOptions) -> Self {
        Self {
            url: answers.url,
            output_dir: Some(answers.output_dir),
            quality: Some(answers.quality),
            verify_output: !options.no_verify,
        }
    }

    fn into_pipeline_config(self, config: &Config) -> PipelineConfig {
        PipelineConfig {
            url: self.url,
            output_dir: self
                .output_dir
                .unwrap_or_else(|| config.output.default_directory.clone()),
            quality: self
                .quality
                .unwrap_or_else(|| Quality::from_flag(config.fetch.prefer_320kbps)),
            verify_output: self.verify_output && config.convert.verify_output,
            paths: config.paths.clone(),
        }
    }
}

pub async fn run(request: Request, config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;
    let pipeline_config = request.into_pipeline_config(&config);
    debug!("Pipeline config: {:?}", pipeline_config);

    let (tx, mut rx) = mpsc::channel(32);

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner:.cyan} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));

    let progress_handle = tokio::spawn(async move {
        while let Some(stage) = rx.recv().await {
            match stage {
                PipelineStage::Fetching { url } => {
                    pb.set_message(format!("Downloading: {}", truncate(&url, 50)));
                }
                PipelineStage::Fetched { path, title } => {
                    pb.println(format!("Successfully downloaded: {}", path.display()));
                    pb.set_message(format!("Downloaded: {}", truncate(&title, 40)));
                }
                PipelineStage::Converting { from } => {
                    pb.set_message(format!("Converting {} to MP3...", from.display()));
                }
                PipelineStage::Complete { output, duration } => {
                    pb.finish_with_message(format!(
                        "Done: {} ({:.1}s)",
                        output.display(),
                        duration.as_secs_f32()
                    ));
                }
                PipelineStage::Unsupported { path } => {
                    pb.abandon_with_message(format!(
                        "Downloaded audio is not in mp3 or webm format: {}",
                        path.display()
                    ));
                }
                PipelineStage::Failed { stage, error } => {
                    pb.abandon_with_message(format!("Failed at {}: {}", stage, error));
                }
            }
        }
    });

    let pipeline = Pipeline::new(pipeline_config, tx);
    let result = pipeline.run().await;
    drop(pipeline);

    progress_handle.await?;

    // Failures are reported, never turned into a crash or exit status
    match result {
        Ok(Outcome::AlreadyMp3(path)) => println!("\nOutput: {}", path.display()),
        Ok(Outcome::Converted { output, .. }) => println!("\nConverted to MP3: {}", output.display()),
        Ok(Outcome::Unsupported(path)) => {
            println!("\nThe file was kept at {}", path.display());
            println!("Convert it manually, e.g. ffmpeg -i <file> <name>.mp3");
        }
        Err(e) => eprintln!("\nAn error occurred: {}", e),
    }

    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_falls_back_to_config() {
        let mut config = Config::default();
        config.output.default_directory = PathBuf::from("music");
        config.fetch.prefer_320kbps = true;

        let request = Request::from_options("u".to_string(), &FetchOptions::default());
        let pipeline_config = request.into_pipeline_config(&config);

        assert_eq!(pipeline_config.output_dir, PathBuf::from("music"));
        assert_eq!(pipeline_config.quality, Quality::Prefer320);
        assert!(pipeline_config.verify_output);
    }

    #[test]
    fn test_answers_override_config() {
        let mut config = Config::default();
        config.output.default_directory = PathBuf::from("music");
        config.fetch.prefer_320kbps = true;

        let answers = Answers {
            url: "u".to_string(),
            output_dir: PathBuf::from("."),
            quality: Quality::Best,
        };
        let pipeline_config =
            Request::from_answers(answers, &FetchOptions::default()).into_pipeline_config(&config);

        assert_eq!(pipeline_config.output_dir, PathBuf::from("."));
        assert_eq!(pipeline_config.quality, Quality::Best);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
    }
}

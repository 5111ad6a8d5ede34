//! WebM to MP3 conversion using FFmpeg

use crate::error::ConvertError;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct Converter {
    ffmpeg_path: PathBuf,
    verify_output: bool,
}

impl Converter {
    pub fn new(ffmpeg_path: PathBuf) -> Self {
        Self {
            ffmpeg_path,
            verify_output: true,
        }
    }

    /// Toggle the non-empty output check made before deleting the source
    pub fn verify_output(mut self, verify: bool) -> Self {
        self.verify_output = verify;
        self
    }

    /// Convert `input` to `<output_dir>/<stem>.mp3`, then delete `input`.
    ///
    /// The source file is only removed once ffmpeg has exited successfully,
    /// so every error path leaves it in place.
    pub async fn convert(&self, input: &Path, output_dir: &Path) -> Result<PathBuf, ConvertError> {
        let output = mp3_target(input, output_dir)?;
        info!("Converting {} to MP3", input.display());

        let result = Command::new(&self.ffmpeg_path)
            .args(encoder_args(input, &output))
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ConvertError::EncoderNotFound,
                _ => ConvertError::Io(e),
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            warn!("ffmpeg failed, keeping {}", input.display());
            return Err(ConvertError::EncoderFailed {
                code: result.status.code(),
                stderr,
            });
        }

        if self.verify_output {
            let written = tokio::fs::metadata(&output)
                .await
                .map(|m| m.len())
                .unwrap_or(0);
            if written == 0 {
                return Err(ConvertError::EmptyOutput(output));
            }
        }

        tokio::fs::remove_file(input).await?;
        debug!("Removed source: {}", input.display());

        Ok(output)
    }
}

/// Same base name as `input`, `.mp3` extension, rooted at `output_dir`
pub fn mp3_target(input: &Path, output_dir: &Path) -> Result<PathBuf, ConvertError> {
    let stem = input
        .file_stem()
        .ok_or_else(|| ConvertError::InvalidInput(input.to_path_buf()))?;

    let mut name = stem.to_os_string();
    name.push(".mp3");
    Ok(output_dir.join(name))
}

/// `-i <input> <output>`
fn encoder_args(input: &Path, output: &Path) -> Vec<OsString> {
    vec![
        "-i".into(),
        input.as_os_str().to_os_string(),
        output.as_os_str().to_os_string(),
    ]
}

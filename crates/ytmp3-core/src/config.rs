//! Configuration management for ytmp3

use crate::error::ConfigError;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub paths: PathsConfig,
    pub output: OutputConfig,
    pub fetch: FetchConfig,
    pub convert: ConvertConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Path to yt-dlp binary (auto-detected if not set)
    pub yt_dlp: Option<PathBuf>,
    /// Path to FFmpeg binary (auto-detected if not set)
    pub ffmpeg: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory used when none is given on the command line
    pub default_directory: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Prefer >= 320 kbps streams without asking
    pub prefer_320kbps: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertConfig {
    /// Require a non-empty MP3 before the source file is deleted
    pub verify_output: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_directory: PathBuf::from("."),
        }
    }
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self { verify_output: true }
    }
}

impl Config {
    /// Load configuration from file and environment
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(default_config) = Self::default_config_file() {
            if default_config.exists() {
                figment = figment.merge(Toml::file(&default_config));
            }
        }

        if let Some(path) = config_file {
            figment = figment.merge(Toml::file(path));
        }

        // Double underscore keeps `yt_dlp` intact: YTMP3_PATHS__YT_DLP
        figment = figment.merge(Env::prefixed("YTMP3_").split("__"));

        figment.extract().map_err(|e| ConfigError::LoadError(e.to_string()))
    }

    /// `<config_dir>/ytmp3/config.toml`, if the platform has a config dir
    pub fn default_config_file() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("ytmp3/config.toml"))
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Render(e.to_string()))
    }
}

/// Resolve an external tool: configured path first, then PATH lookup
pub fn resolve_tool(configured: Option<&Path>, name: &str) -> Option<PathBuf> {
    match configured {
        Some(path) => Some(path.to_path_buf()),
        None => which::which(name).ok(),
    }
}

use anyhow::Result;
use std::path::Path;
use ytmp3_core::config::Config;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;

    println!("ytmp3 configuration\n");
    println!("{}", config.to_toml()?);

    if config.paths.yt_dlp.is_none() || config.paths.ffmpeg.is_none() {
        println!("Unset tool paths are looked up on PATH.\n");
    }

    println!("Config sources (later entries override earlier ones):");
    if let Some(default_config) = Config::default_config_file() {
        println!("  1. {}", default_config.display());
    }
    if let Some(p) = config_path {
        println!("  2. {} (specified)", p.display());
    }
    println!("  3. Environment variables (YTMP3_*, e.g. YTMP3_PATHS__FFMPEG)");

    Ok(())
}

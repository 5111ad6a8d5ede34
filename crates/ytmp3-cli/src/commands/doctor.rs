use anyhow::Result;
use std::path::{Path, PathBuf};
use std::process::Command;
use ytmp3_core::config::{resolve_tool, Config};

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;

    println!("ytmp3 dependency check\n");

    let yt_dlp_ok = check(
        "yt-dlp:  ",
        resolve_tool(config.paths.yt_dlp.as_deref(), "yt-dlp"),
        "--version",
        |stdout| stdout.trim().to_string(),
        "pip install yt-dlp",
    );

    // Only needed when yt-dlp delivers WebM
    let ffmpeg_ok = check(
        "ffmpeg:  ",
        resolve_tool(config.paths.ffmpeg.as_deref(), "ffmpeg"),
        "-version",
        ffmpeg_version,
        "your package manager (apt install ffmpeg, brew install ffmpeg)",
    );

    println!();
    if yt_dlp_ok && ffmpeg_ok {
        println!("All dependencies OK!");
    } else {
        println!("Some dependencies are missing. See above for installation instructions.");
    }

    Ok(())
}

fn check(
    label: &str,
    path: Option<PathBuf>,
    version_flag: &str,
    parse_version: fn(&str) -> String,
    install_hint: &str,
) -> bool {
    print!("{}", label);

    let Some(path) = path else {
        println!("NOT FOUND");
        println!("         Install with: {}", install_hint);
        return false;
    };

    match Command::new(&path).arg(version_flag).output() {
        Ok(out) if out.status.success() => {
            let version = parse_version(&String::from_utf8_lossy(&out.stdout));
            println!("OK ({}, {})", version, path.display());
            true
        }
        _ => {
            println!("FOUND at {} but failed to get version", path.display());
            false
        }
    }
}

/// "ffmpeg version 6.1.1 Copyright ..." -> "6.1.1"
fn ffmpeg_version(stdout: &str) -> String {
    stdout
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(2))
        .unwrap_or("unknown")
        .to_string()
}

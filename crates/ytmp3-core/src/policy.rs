//! Format policy handed to yt-dlp

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Stream quality preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quality {
    /// Prefer streams of at least 320 kbps, else best available
    Prefer320,
    /// Best available audio
    #[default]
    Best,
}

impl Quality {
    /// Interpret a y/n answer. Only exactly `y` or `Y` opts in.
    pub fn from_answer(answer: &str) -> Self {
        if strip_line_ending(answer).eq_ignore_ascii_case("y") {
            Quality::Prefer320
        } else {
            Quality::Best
        }
    }

    pub fn from_flag(prefer_320kbps: bool) -> Self {
        if prefer_320kbps {
            Quality::Prefer320
        } else {
            Quality::Best
        }
    }

    pub fn format_selector(&self) -> &'static str {
        match self {
            Quality::Prefer320 => "bestaudio[abr>=320]/bestaudio/best",
            Quality::Best => "bestaudio/best",
        }
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Quality::Prefer320 => write!(f, "prefer 320 kbps"),
            Quality::Best => write!(f, "best available"),
        }
    }
}

/// Resolve a user-entered output directory; empty means the current directory
pub fn resolve_output_dir(input: &str) -> PathBuf {
    let entered = strip_line_ending(input);
    if entered.is_empty() {
        PathBuf::from(".")
    } else {
        PathBuf::from(entered)
    }
}

/// Drop the trailing newline a line read leaves behind, nothing else
fn strip_line_ending(line: &str) -> &str {
    line.trim_end_matches(|c: char| c == '\r' || c == '\n')
}

/// Immutable selection and naming rules for one download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatPolicy {
    pub format_selector: String,
    pub output_template: PathBuf,
    pub no_playlist: bool,
    pub no_cache: bool,
}

impl FormatPolicy {
    pub const FILENAME_TEMPLATE: &'static str = "%(title)s.%(ext)s";

    pub fn new(quality: Quality, output_dir: &Path) -> Self {
        Self {
            format_selector: quality.format_selector().to_string(),
            output_template: output_dir.join(Self::FILENAME_TEMPLATE),
            no_playlist: true,
            no_cache: true,
        }
    }

    /// yt-dlp arguments for this policy, excluding the URL
    pub fn to_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-f".into(),
            self.format_selector.clone().into(),
            "-o".into(),
            self.output_template.clone().into_os_string(),
        ];

        if self.no_playlist {
            args.push("--no-playlist".into());
        }
        if self.no_cache {
            args.push("--no-cache-dir".into());
        }

        args
    }
}

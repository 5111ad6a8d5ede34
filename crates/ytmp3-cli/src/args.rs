use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ytmp3")]
#[command(author, version, about = "Download video audio and convert it to MP3")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Video URL to download (prompts interactively when omitted)
    #[arg(value_name = "URL")]
    pub url: Option<String>,

    #[command(flatten)]
    pub options: FetchOptions,

    /// Verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download audio from a single URL
    Fetch {
        /// Video URL
        url: String,

        #[command(flatten)]
        options: FetchOptions,
    },

    /// Check that yt-dlp and ffmpeg are installed
    Doctor,

    /// Show configuration
    Config,
}

#[derive(clap::Args, Clone, Debug, Default)]
pub struct FetchOptions {
    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Prefer 320 kbps audio when available
    #[arg(long = "prefer-320")]
    pub prefer_320: bool,

    /// Delete the source even if ffmpeg leaves an empty MP3
    #[arg(long)]
    pub no_verify: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_bare_url_with_options() {
        let cli = Cli::parse_from(["ytmp3", "https://youtu.be/abc", "-o", "out", "--prefer-320"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.url.as_deref(), Some("https://youtu.be/abc"));
        assert_eq!(cli.options.output, Some(PathBuf::from("out")));
        assert!(cli.options.prefer_320);
    }

    #[test]
    fn test_no_arguments_means_interactive() {
        let cli = Cli::parse_from(["ytmp3"]);
        assert!(cli.command.is_none());
        assert!(cli.url.is_none());
    }
}

mod args;
mod commands;
mod prompt;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use args::{Cli, Commands};
use commands::fetch::Request;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let filter = match cli.verbose {
        0 => "ytmp3=info",
        1 => "ytmp3=debug",
        2 => "ytmp3=trace",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match cli.command {
        Some(Commands::Fetch { url, options }) => {
            commands::fetch::run(Request::from_options(url, &options), cli.config.as_deref()).await
        }
        Some(Commands::Doctor) => commands::doctor::run(cli.config.as_deref()).await,
        Some(Commands::Config) => commands::config::run(cli.config.as_deref()).await,
        None => {
            let request = match cli.url {
                Some(url) => Request::from_options(url, &cli.options),
                None => {
                    let stdin = std::io::stdin();
                    let answers = prompt::ask(&mut stdin.lock(), &mut std::io::stdout())?;
                    Request::from_answers(answers, &cli.options)
                }
            };
            commands::fetch::run(request, cli.config.as_deref()).await
        }
    }
}

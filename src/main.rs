// ABOUTME: Entry point for the tugboat CLI application.
// ABOUTME: Parses arguments, sets up logging and dispatches to command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use std::env;
use tracing_subscriber::EnvFilter;
use tugboat::error::Result;
use tugboat::output::{Output, OutputMode};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // -v wins over RUST_LOG; otherwise RUST_LOG, then warn
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };

    if let Err(e) = run(cli, mode).await {
        Output::new(mode).error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, mode: OutputMode) -> Result<()> {
    let output = Output::new(mode);
    let cwd = env::current_dir()?;

    match cli.command {
        Commands::Init { environment, force } => commands::init(&cwd, environment, force, &output),
        Commands::Plan => {
            let (config, _) = commands::load_config(&cwd, cli.config.as_deref())?;
            commands::plan(&config, &output)
        }
        Commands::Diff => {
            let (config, _) = commands::load_config(&cwd, cli.config.as_deref())?;
            commands::diff(&config, &output).await
        }
        Commands::Deploy {
            retries,
            backoff,
            wait,
            debug,
            events,
        } => {
            let (config, project_dir) = commands::load_config(&cwd, cli.config.as_deref())?;
            let args = commands::DeployArgs {
                retries,
                backoff,
                wait,
                debug,
                events,
            };
            commands::deploy(config, &project_dir, args, output).await
        }
    }
}

// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use tugboat::config::Environment;

#[derive(Parser)]
#[command(name = "tugboat")]
#[command(about = "Dependency-ordered Helm release deployment with retry and rollback")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print the final result
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print events and results as JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to the config file (default: discovered in the current directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new tugboat.yml configuration file
    Init {
        /// Environment written into the config
        #[arg(short, long, default_value = "dev")]
        environment: Environment,

        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Print the order in which releases would be deployed
    Plan,

    /// Deploy every release in dependency order
    Deploy {
        /// Maximum install/upgrade attempts per release
        #[arg(long)]
        retries: Option<u32>,

        /// Delay between attempts (e.g. 2s, 500ms)
        #[arg(long, value_parser = parse_duration)]
        backoff: Option<Duration>,

        /// Wait for release pods to become ready
        #[arg(long)]
        wait: bool,

        /// Show a diff before installing each release
        #[arg(long)]
        debug: bool,

        /// Append every event as a JSON line to this file
        #[arg(long)]
        events: Option<PathBuf>,
    },

    /// Show what an upgrade would change for every release
    Diff,
}

fn parse_duration(s: &str) -> Result<Duration, String> {
    humantime_serde::re::humantime::parse_duration(s).map_err(|e| e.to_string())
}

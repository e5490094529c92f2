//! CLI argument parsing types using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// `apwatch` access point and DHCP monitor
#[derive(Parser)]
#[command(name = "apwatch")]
#[command(author, version, about = "Access point and DHCP pool monitor")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config.toml
    #[arg(short, long, global = true, env = "APWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Poll on a schedule and serve snapshots over WebSocket
    #[command(about = "Run the poller and the push server until interrupted")]
    Run {
        /// Override the push server listen address
        #[arg(short, long, value_name = "ADDR")]
        bind: Option<String>,

        /// Override the polling interval in seconds
        #[arg(short, long, value_name = "SECS")]
        interval: Option<u64>,
    },

    /// Run a single cycle and print the snapshot
    #[command(about = "Poll every device once and print the snapshot as JSON")]
    Poll {
        /// Do not write the cycle transcript
        #[arg(long)]
        no_log: bool,

        /// Pretty-print the JSON
        #[arg(short, long)]
        pretty: bool,
    },

    /// Extract a snapshot from a saved transcript
    #[command(about = "Parse a transcript file and print the resulting snapshot")]
    Parse {
        /// Transcript file
        file: PathBuf,

        /// Pretty-print the JSON
        #[arg(short, long)]
        pretty: bool,

        /// Print each skipped line to stderr
        #[arg(long)]
        anomalies: bool,
    },

    /// Validate the configuration
    #[command(about = "Load and validate the configuration file")]
    Check {
        /// Also resolve every device host name
        #[arg(long)]
        resolve: bool,
    },

    /// Generate shell completions
    #[command(about = "Generate shell completion scripts")]
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

//! `apwatch` CLI - access point and DHCP pool monitor
//!
//! Provides commands to run the polling daemon with its WebSocket push
//! server, poll once, parse saved transcripts and check configuration.

mod cli;
mod commands;
mod error;
mod util;

use clap::Parser;
use cli::Cli;
use util::Verbosity;

fn main() {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();
    let verbosity = Verbosity {
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    let result = commands::dispatch(config_path, verbosity, cli.command);

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}

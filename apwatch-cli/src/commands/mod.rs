//! Command handler modules for the CLI.

mod check;
mod completions;
mod parse;
mod poll;
mod run;

use std::path::Path;

use crate::cli::Commands;
use crate::error::CliError;
use crate::util::Verbosity;

/// Dispatch a CLI command to the appropriate handler.
pub fn dispatch(
    config_path: Option<&Path>,
    verbosity: Verbosity,
    command: Commands,
) -> Result<(), CliError> {
    match command {
        Commands::Run { bind, interval } => run::cmd_run(
            config_path,
            verbosity,
            run::RunOverrides {
                bind: bind.as_deref(),
                interval_secs: interval,
            },
        ),
        Commands::Poll { no_log, pretty } => poll::cmd_poll(config_path, verbosity, no_log, pretty),
        Commands::Parse {
            file,
            pretty,
            anomalies,
        } => parse::cmd_parse(config_path, verbosity, &file, pretty, anomalies),
        Commands::Check { resolve } => check::cmd_check(config_path, verbosity, resolve),
        Commands::Completions { shell } => completions::cmd_completions(shell),
    }
}

//! Shared utility functions used across command modules.

use std::path::Path;

use apwatch_core::config::{AppSettings, ConfigManager, LoggingSettings};
use apwatch_core::tracing::{TracingConfig, TracingLevel, TracingOutput, init_tracing};

use crate::error::CliError;

/// Global flags that shape logging
#[derive(Debug, Clone, Copy)]
pub struct Verbosity {
    /// `-v` count
    pub verbose: u8,
    /// `--quiet`
    pub quiet: bool,
}

/// Loads the configuration from the flag, `APWATCH_CONFIG` or the default
/// location. Only parses; callers validate what they need.
pub fn load_settings(config_path: Option<&Path>) -> Result<AppSettings, CliError> {
    let manager = ConfigManager::resolve(config_path)?;
    manager.load().map_err(|e| {
        CliError::Config(format!(
            "Failed to load {}: {e}",
            manager.path().display()
        ))
    })
}

/// Like [`load_settings`], but falls back to defaults when no path was
/// given and the default file does not exist
pub fn load_settings_or_default(config_path: Option<&Path>) -> Result<AppSettings, CliError> {
    let manager = ConfigManager::resolve(config_path)?;
    if config_path.is_none() && !manager.path().exists() {
        return Ok(AppSettings::default());
    }
    load_settings(Some(manager.path()))
}

/// Installs the log subscriber
///
/// `-v` raises the configured level one step per flag, `--quiet` wins over
/// both. Short commands always log to stderr; only `run` and `poll` honour
/// `[logging] file`.
pub fn init_logging(
    logging: &LoggingSettings,
    verbosity: Verbosity,
    use_file: bool,
) -> Result<(), CliError> {
    let level = if verbosity.quiet {
        TracingLevel::Error
    } else {
        logging.level.raised_by(verbosity.verbose)
    };

    let mut config = logging.tracing_config().with_level(level);
    if !use_file {
        config = config.with_output(TracingOutput::Stderr);
    }
    if verbosity.quiet || verbosity.verbose > 0 {
        // Flags override a configured filter directive
        config = TracingConfig {
            filter: None,
            ..config
        };
    }

    init_tracing(&config)?;
    Ok(())
}

/// Builds the runtime used by the async commands
pub fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CliError::Runtime(format!("Failed to create async runtime: {e}")))
}

/// Serializes a snapshot for stdout
pub fn snapshot_json(snapshot: &apwatch_core::Snapshot, pretty: bool) -> Result<String, CliError> {
    let json = if pretty {
        serde_json::to_string_pretty(snapshot)
    } else {
        serde_json::to_string(snapshot)
    };
    json.map_err(|e| CliError::Output(e.to_string()))
}

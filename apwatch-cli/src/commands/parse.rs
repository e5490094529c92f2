//! Offline transcript parsing command.

use std::path::Path;

use apwatch_core::{Extractor, Transcript, aggregate};

use crate::error::CliError;
use crate::util::{Verbosity, init_logging, load_settings_or_default, snapshot_json};

/// Extracts and aggregates a saved transcript and prints the snapshot
///
/// Only the `[access_points]` and `[extract]` sections are used; without a
/// config file the defaults apply.
pub fn cmd_parse(
    config_path: Option<&Path>,
    verbosity: Verbosity,
    file: &Path,
    pretty: bool,
    show_anomalies: bool,
) -> Result<(), CliError> {
    let settings = load_settings_or_default(config_path)?;
    init_logging(&settings.logging, verbosity, false)?;
    settings.validate_extraction()?;

    let text = std::fs::read_to_string(file).map_err(|e| {
        CliError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {e}", file.display()),
        ))
    })?;
    let source = file
        .file_name()
        .map_or_else(|| file.display().to_string(), |n| n.to_string_lossy().into_owned());
    let transcript = Transcript::from_text(source, text);

    let extractor = Extractor::new(&settings.extract, &settings.access_points.prefix)?;
    let records = extractor.extract_all(&transcript);
    let snapshot = aggregate(&records, &settings.access_points);

    println!("{}", snapshot_json(&snapshot, pretty)?);

    if !verbosity.quiet && !records.anomalies.is_empty() {
        eprintln!("{} line(s) skipped", records.anomalies.len());
        if show_anomalies {
            for anomaly in &records.anomalies {
                eprintln!("  {anomaly}");
            }
        }
    }
    Ok(())
}

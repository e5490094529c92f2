//! Single-cycle poll command.

use std::path::Path;
use std::sync::Arc;

use apwatch_core::poller::{CycleOutcome, CycleReport};
use apwatch_core::{FileTranscriptSink, Orchestrator, SessionRunner};

use crate::error::CliError;
use crate::util::{Verbosity, init_logging, load_settings, runtime, snapshot_json};

/// Polls every device once and prints the snapshot
///
/// The snapshot is printed even when devices fail; the command then exits
/// with the device failure code.
pub fn cmd_poll(
    config_path: Option<&Path>,
    verbosity: Verbosity,
    no_log: bool,
    pretty: bool,
) -> Result<(), CliError> {
    let settings = load_settings(config_path)?;
    init_logging(&settings.logging, verbosity, true)?;
    settings.validate()?;

    let mut orchestrator = Orchestrator::new(&settings, SessionRunner::tcp())?;
    if settings.transcript.enabled && !no_log {
        let sink = FileTranscriptSink::new(settings.transcript.effective_path());
        orchestrator = orchestrator.with_sink(Arc::new(sink));
    }

    let outcome = runtime()?.block_on(orchestrator.run_cycle());
    let CycleOutcome::Completed(report) = outcome else {
        return Err(CliError::Runtime("cycle did not run".to_string()));
    };

    println!("{}", snapshot_json(&report.snapshot, pretty)?);
    if !verbosity.quiet {
        print_report(&report);
    }

    if report.all_devices_succeeded() {
        Ok(())
    } else {
        let failed: Vec<_> = report
            .devices
            .iter()
            .filter(|d| !d.outcome.is_success())
            .map(|d| d.device.as_str())
            .collect();
        Err(CliError::DeviceFailure(failed.join(", ")))
    }
}

fn print_report(report: &CycleReport) {
    for device in &report.devices {
        eprintln!(
            "{}: {} ({} bytes)",
            device.device, device.outcome, device.transcript_len
        );
    }
    if report.anomalies > 0 {
        eprintln!("{} line(s) skipped during extraction", report.anomalies);
    }
}

//! Daemon command: scheduler plus push server.

use std::path::Path;
use std::sync::Arc;

use apwatch_core::poller::{effective_interval, start_scheduler};
use apwatch_core::{ApWatchError, FileTranscriptSink, Orchestrator, PushServer, SessionRunner};
use tracing::info;

use crate::error::CliError;
use crate::util::{Verbosity, init_logging, load_settings, runtime};

/// Command-line overrides for `run`
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOverrides<'a> {
    /// Push server listen address
    pub bind: Option<&'a str>,
    /// Polling interval in seconds
    pub interval_secs: Option<u64>,
}

/// Runs cycles on the configured interval and serves snapshots until
/// Ctrl-C
pub fn cmd_run(
    config_path: Option<&Path>,
    verbosity: Verbosity,
    overrides: RunOverrides<'_>,
) -> Result<(), CliError> {
    let settings = load_settings(config_path)?;
    init_logging(&settings.logging, verbosity, true)?;
    settings.validate()?;
    settings.resolve_devices()?;

    let bind = overrides.bind.unwrap_or(&settings.server.bind).to_string();
    let interval = overrides
        .interval_secs
        .map_or_else(|| settings.poller.effective_interval(), effective_interval);

    let mut orchestrator = Orchestrator::new(&settings, SessionRunner::tcp())?;
    if settings.transcript.enabled {
        let sink = FileTranscriptSink::new(settings.transcript.effective_path());
        orchestrator = orchestrator.with_sink(Arc::new(sink));
    }
    let orchestrator = Arc::new(orchestrator);

    runtime()?.block_on(async move {
        let registry = Arc::clone(orchestrator.context().subscribers());
        let server = PushServer::bind(&bind, registry)
            .await
            .map_err(|e| ApWatchError::Server(format!("cannot listen on {bind}: {e}")))?;
        let server_task = tokio::spawn(server.run());

        let scheduler = start_scheduler(Arc::clone(&orchestrator), interval);
        info!(
            devices = orchestrator.device_count(),
            interval_secs = interval.as_secs(),
            %bind,
            "apwatch running"
        );

        let signal = tokio::signal::ctrl_c().await;
        info!("Shutting down");
        scheduler.stop().await;
        server_task.abort();
        signal?;
        Ok::<(), CliError>(())
    })
}

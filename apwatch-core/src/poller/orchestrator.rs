//! Polling cycle orchestration

use std::sync::Arc;
use std::time::Instant;

use tracing::{Instrument, info, info_span, warn};

use super::context::MonitorContext;
use crate::config::AppSettings;
use crate::error::ConfigResult;
use crate::extract::Extractor;
use crate::fanout::BroadcastSummary;
use crate::session::{SessionOutcome, SessionPlan, SessionRunner};
use crate::snapshot::{ApRange, Snapshot, aggregate, empty_snapshot};
use crate::transcript::{NullTranscriptSink, Transcript, TranscriptSink};

/// Outcome of one device session within a cycle
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceReport {
    /// Device name
    pub device: String,
    /// How its session ended
    pub outcome: SessionOutcome,
    /// Bytes of console text captured
    pub transcript_len: usize,
}

/// Summary of a completed cycle
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// Per-device outcomes in polling order
    pub devices: Vec<DeviceReport>,
    /// The snapshot that replaced the current one
    pub snapshot: Arc<Snapshot>,
    /// Lines skipped during extraction
    pub anomalies: usize,
    /// Fan-out result
    pub broadcast: BroadcastSummary,
}

impl CycleReport {
    /// Returns true if every device session completed
    #[must_use]
    pub fn all_devices_succeeded(&self) -> bool {
        self.devices.iter().all(|d| d.outcome.is_success())
    }
}

/// Result of a cycle trigger
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    /// The cycle ran
    Completed(CycleReport),
    /// Another cycle was in flight; nothing was done
    Skipped,
}

/// Runs polling cycles: sessions, persistence, extraction, aggregation
/// and fan-out
pub struct Orchestrator {
    plans: Vec<Arc<SessionPlan>>,
    runner: SessionRunner,
    extractor: Extractor,
    range: ApRange,
    sink: Arc<dyn TranscriptSink>,
    context: Arc<MonitorContext>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("devices", &self.plans.len())
            .field("range", &self.range)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Compiles every device plan and the extractor from `settings`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any device, the extraction settings or the
    /// access point range is invalid.
    pub fn new(settings: &AppSettings, runner: SessionRunner) -> ConfigResult<Self> {
        settings.access_points.validate()?;
        let plans = settings
            .devices
            .iter()
            .map(|device| SessionPlan::compile(device).map(Arc::new))
            .collect::<ConfigResult<Vec<_>>>()?;
        let extractor = Extractor::new(&settings.extract, &settings.access_points.prefix)?;
        let range = settings.access_points.clone();
        let context = Arc::new(MonitorContext::new(empty_snapshot(&range)));

        Ok(Self {
            plans,
            runner,
            extractor,
            range,
            sink: Arc::new(NullTranscriptSink),
            context,
        })
    }

    /// Sets where cycle transcripts are persisted
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn TranscriptSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Shared state: current snapshot, guard and subscribers
    #[must_use]
    pub fn context(&self) -> &Arc<MonitorContext> {
        &self.context
    }

    /// Number of configured devices
    #[must_use]
    pub fn device_count(&self) -> usize {
        self.plans.len()
    }

    /// Runs one cycle unless another one is in flight
    ///
    /// Devices are polled one after the other in configuration order;
    /// each is attempted even if an earlier one failed. The cycle always
    /// ends with a new snapshot.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let Some(_guard) = self.context.try_begin_cycle() else {
            info!("Cycle already running, trigger ignored");
            return CycleOutcome::Skipped;
        };

        let span = info_span!(crate::tracing::span_names::CYCLE_RUN, devices = self.plans.len());
        let report = self.execute().instrument(span).await;
        CycleOutcome::Completed(report)
    }

    async fn execute(&self) -> CycleReport {
        let started = Instant::now();
        let mut transcript = Transcript::new();
        let mut devices = Vec::with_capacity(self.plans.len());

        for plan in &self.plans {
            let segment = self.runner.run(Arc::clone(plan)).await;
            devices.push(DeviceReport {
                device: segment.device.clone(),
                outcome: segment.outcome.clone(),
                transcript_len: segment.text.len(),
            });
            transcript.push(segment);
        }

        if let Err(e) = self.sink.persist(&transcript).await {
            warn!(error = %e, "Failed to persist transcript");
        }

        let records = self.extractor.extract_all(&transcript);
        let snapshot = Arc::new(aggregate(&records, &self.range));
        self.context.replace_snapshot(Arc::clone(&snapshot));
        let broadcast = self.context.subscribers().broadcast(&snapshot);

        let failed = devices.iter().filter(|d| !d.outcome.is_success()).count();
        info!(
            devices = devices.len(),
            failed,
            anomalies = records.anomalies.len(),
            subscribers = broadcast.delivered,
            duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Cycle finished"
        );

        CycleReport {
            devices,
            snapshot,
            anomalies: records.anomalies.len(),
            broadcast,
        }
    }
}

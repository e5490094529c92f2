//! Periodic cycle trigger

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use super::orchestrator::{CycleOutcome, Orchestrator};

/// Shortest accepted polling interval in seconds
pub const MIN_INTERVAL_SECS: u64 = 5;
/// Longest accepted polling interval in seconds
pub const MAX_INTERVAL_SECS: u64 = 3600;

/// Clamps a polling interval to `MIN_INTERVAL_SECS..=MAX_INTERVAL_SECS`
#[must_use]
pub fn effective_interval(secs: u64) -> Duration {
    Duration::from_secs(secs.clamp(MIN_INTERVAL_SECS, MAX_INTERVAL_SECS))
}

/// Handle to a running scheduler
#[derive(Debug)]
pub struct SchedulerHandle {
    stop_tx: mpsc::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl SchedulerHandle {
    /// Stops the scheduler and waits for its loop to end
    ///
    /// A cycle already spawned keeps running to completion.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(()).await;
        let _ = self.task.await;
    }
}

/// Starts triggering cycles every `interval`, the first one immediately
///
/// Each tick spawns its cycle, so a tick arriving while a cycle still runs
/// reaches the in-flight guard and is skipped. Missed ticks are not
/// replayed.
#[must_use]
pub fn start_scheduler(orchestrator: Arc<Orchestrator>, interval: Duration) -> SchedulerHandle {
    let (stop_tx, mut stop_rx) = mpsc::channel::<()>(1);

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(interval_secs = interval.as_secs(), "Scheduler started");

        loop {
            tokio::select! {
                _ = stop_rx.recv() => break,
                _ = ticker.tick() => {
                    let orchestrator = Arc::clone(&orchestrator);
                    tokio::spawn(async move {
                        if let CycleOutcome::Skipped = orchestrator.run_cycle().await {
                            debug!("Tick skipped, previous cycle still running");
                        }
                    });
                }
            }
        }
        info!("Scheduler stopped");
    });

    SchedulerHandle { stop_tx, task }
}

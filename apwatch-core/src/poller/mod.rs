//! Polling cycles
//!
//! The [`Orchestrator`] runs one cycle at a time across all devices and
//! owns the [`MonitorContext`]; [`start_scheduler`] triggers it
//! periodically.

mod context;
mod orchestrator;
mod scheduler;

pub use context::{CycleGuard, MonitorContext};
pub use orchestrator::{CycleOutcome, CycleReport, DeviceReport, Orchestrator};
pub use scheduler::{
    MAX_INTERVAL_SECS, MIN_INTERVAL_SECS, SchedulerHandle, effective_interval, start_scheduler,
};

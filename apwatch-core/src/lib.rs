//! `apwatch` Core Library
//!
//! Polls wireless controllers and DHCP servers over their Telnet consoles,
//! extracts per access point radio, client and capacity figures from the
//! captured text, and pushes a leveled [`Snapshot`] to dashboard clients.
//!
//! # Crate Structure
//!
//! - [`config`] - `config.toml` loading and validation
//! - [`protocol`] - Telnet option filtering and line framing
//! - [`automation`] - Expect rules for login prompts
//! - [`session`] - Per-device session state machine and its socket driver
//! - [`transcript`] - Captured console text and its persistence
//! - [`extract`] - Transcript sections to radio, client, capacity and DHCP records
//! - [`snapshot`] - Aggregation into the leveled dashboard snapshot
//! - [`fanout`] - Subscriber registry and WebSocket push server
//! - [`poller`] - Cycle orchestration, in-flight guard and scheduler
//! - [`tracing`] - Structured logging setup

// Enable missing_docs warning for public API documentation
#![warn(missing_docs)]

pub mod automation;
pub mod config;
pub mod error;
pub mod extract;
pub mod fanout;
pub mod poller;
pub mod protocol;
pub mod session;
pub mod snapshot;
pub mod tracing;
pub mod transcript;

pub use config::{AppSettings, ConfigManager, DeviceConfig};
pub use error::{ApWatchError, ConfigError, ConfigResult, DeliveryError, SessionError};
pub use extract::{ExtractSettings, ExtractedRecords, Extractor, ParseAnomaly};
pub use fanout::{PushServer, SubscriberRegistry};
pub use poller::{CycleOutcome, CycleReport, MonitorContext, Orchestrator, start_scheduler};
pub use session::{SessionOutcome, SessionRunner};
pub use snapshot::{ApRange, ApView, Snapshot, SsidView, aggregate};
pub use transcript::{FileTranscriptSink, Transcript};

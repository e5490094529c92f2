//! Snapshot fan-out to dashboard observers
//!
//! Push only: a subscriber sees the snapshots broadcast after it
//! registered and nothing before. The current snapshot for a first paint
//! is read from [`crate::poller::MonitorContext::current_snapshot`].

mod registry;
mod server;

pub use registry::{BroadcastSummary, SUBSCRIBER_QUEUE_CAPACITY, SubscriberRegistry};
pub use server::PushServer;

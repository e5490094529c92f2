//! Snapshot model and aggregation
//!
//! A [`Snapshot`] is the whole dashboard state after one cycle: every AP of
//! the configured [`ApRange`] with its radio values and per-SSID client
//! levels, plus the DHCP pool utilization.

mod aggregator;
mod model;
mod range;

pub use aggregator::{aggregate, aggregate_at, empty_snapshot, unlisted_aps};
pub use model::{ApView, MAX_LEVEL, Snapshot, SsidView, level_for};
pub use range::{ApRange, MAX_RANGE_LEN};

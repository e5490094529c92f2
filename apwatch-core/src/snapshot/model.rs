//! Snapshot wire model
//!
//! Serialized with camelCase keys; each push message is one complete
//! [`Snapshot`].

use serde::{Deserialize, Serialize};

/// Highest level a metric can reach
pub const MAX_LEVEL: u8 = 10;

/// Fullness bucket of `count` clients over a `max_count` threshold
///
/// `floor(count * 100 / max_count) / 10`, capped at [`MAX_LEVEL`]; 0 when
/// no threshold is known.
#[must_use]
pub fn level_for(count: u32, max_count: u32) -> u8 {
    if max_count == 0 {
        return 0;
    }
    let percentage = u64::from(count) * 100 / u64::from(max_count);
    u8::try_from((percentage / 10).min(u64::from(MAX_LEVEL))).unwrap_or(MAX_LEVEL)
}

/// One SSID on one access point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsidView {
    /// SSID name
    pub name: String,
    /// Associated clients
    pub count: u32,
    /// Max clients threshold, 0 when unknown
    pub max_count: u32,
    /// Derived level 0..=10
    pub level: u8,
}

impl SsidView {
    /// Creates a view and derives its level
    #[must_use]
    pub fn new(name: impl Into<String>, count: u32, max_count: u32) -> Self {
        Self {
            name: name.into(),
            count,
            max_count,
            level: level_for(count, max_count),
        }
    }
}

/// One access point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApView {
    /// Access point id, e.g. `ap_01`
    pub id: String,
    /// Channel or `-`
    pub channel: String,
    /// Transmit power or `-`
    pub power_dbm: String,
    /// SSIDs served by this AP
    pub ssids: Vec<SsidView>,
    /// Highest SSID level, 0 without SSIDs
    pub level: u8,
}

impl ApView {
    /// Creates a view and derives its level from the SSIDs
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        channel: impl Into<String>,
        power_dbm: impl Into<String>,
        ssids: Vec<SsidView>,
    ) -> Self {
        let level = ssids.iter().map(|s| s.level).max().unwrap_or(0);
        Self {
            id: id.into(),
            channel: channel.into(),
            power_dbm: power_dbm.into(),
            ssids,
            level,
        }
    }
}

/// State pushed to the dashboard after every cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Aggregation time, seconds since the Unix epoch
    pub captured_at_epoch_seconds: i64,
    /// Exactly the configured AP range, ascending
    pub access_points: Vec<ApView>,
    /// DHCP pool utilization in percent
    pub dhcp_utilization: f64,
}

impl Snapshot {
    /// Looks up an access point by id
    #[must_use]
    pub fn access_point(&self, id: &str) -> Option<&ApView> {
        self.access_points.iter().find(|ap| ap.id == id)
    }

    /// Serializes to the JSON pushed to subscribers
    ///
    /// # Errors
    ///
    /// Returns the serializer error (not expected for this model).
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

//! Typed records produced by the extractors

use std::collections::BTreeMap;

use serde::Serialize;

/// Sentinel for a radio value that was not reported
pub const MISSING_VALUE: &str = "-";

/// Radio status of one access point
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RadioRecord {
    /// Access point name, e.g. `ap_01`
    pub ap_id: String,
    /// Channel as printed by the controller, or `-`
    pub channel: String,
    /// Transmit power as printed by the controller, or `-`
    pub power_dbm: String,
    /// SSIDs served by this AP, in first-seen order without duplicates
    pub ssid_names: Vec<String>,
}

impl RadioRecord {
    /// Record for an AP that did not appear in the listing
    #[must_use]
    pub fn missing(ap_id: impl Into<String>) -> Self {
        Self {
            ap_id: ap_id.into(),
            channel: MISSING_VALUE.to_string(),
            power_dbm: MISSING_VALUE.to_string(),
            ssid_names: Vec::new(),
        }
    }

    /// Appends an SSID unless it is already listed
    pub fn add_ssid(&mut self, name: &str) {
        if !self.ssid_names.iter().any(|s| s == name) {
            self.ssid_names.push(name.to_string());
        }
    }
}

/// Client tally keyed by access point, then SSID
///
/// SSIDs keep the order in which their first client row was seen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClientCounts {
    by_ap: BTreeMap<String, Vec<(String, u32)>>,
}

impl ClientCounts {
    /// Creates an empty tally
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one more client of `ssid` on `ap_id`
    pub fn increment(&mut self, ap_id: &str, ssid: &str) {
        let entries = self.by_ap.entry(ap_id.to_string()).or_default();
        if let Some(entry) = entries.iter_mut().find(|(name, _)| name == ssid) {
            entry.1 += 1;
        } else {
            entries.push((ssid.to_string(), 1));
        }
    }

    /// Number of clients of `ssid` on `ap_id` (0 if never seen)
    #[must_use]
    pub fn count(&self, ap_id: &str, ssid: &str) -> u32 {
        self.by_ap
            .get(ap_id)
            .and_then(|entries| entries.iter().find(|(name, _)| name == ssid))
            .map_or(0, |(_, count)| *count)
    }

    /// SSIDs with at least one client on `ap_id`
    pub fn ssids_for<'a>(&'a self, ap_id: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.by_ap
            .get(ap_id)
            .into_iter()
            .flat_map(|entries| entries.iter().map(|(name, _)| name.as_str()))
    }

    /// Total number of client rows counted
    #[must_use]
    pub fn total(&self) -> u32 {
        self.by_ap
            .values()
            .flat_map(|entries| entries.iter().map(|(_, count)| *count))
            .sum()
    }

    /// Returns true if no client was counted
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_ap.is_empty()
    }
}

/// Max-clients threshold per SSID
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SsidCapacities {
    thresholds: BTreeMap<String, u32>,
}

impl SsidCapacities {
    /// Creates an empty map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the threshold for `ssid`; a later entry overrides an earlier one
    pub fn insert(&mut self, ssid: &str, max_clients: u32) {
        self.thresholds.insert(ssid.to_string(), max_clients);
    }

    /// Threshold for `ssid`, 0 when unknown
    #[must_use]
    pub fn get(&self, ssid: &str) -> u32 {
        self.thresholds.get(ssid).copied().unwrap_or(0)
    }

    /// Number of SSIDs with a threshold
    #[must_use]
    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    /// Returns true if no threshold was found
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }
}

//! Folds extracted records into a dense, leveled snapshot

use chrono::Utc;

use super::model::{ApView, Snapshot, SsidView};
use super::range::ApRange;
use crate::extract::{ExtractedRecords, MISSING_VALUE};

/// Builds the snapshot for `records`, stamped with the current time
#[must_use]
pub fn aggregate(records: &ExtractedRecords, range: &ApRange) -> Snapshot {
    aggregate_at(records, range, Utc::now().timestamp())
}

/// Builds the snapshot for `records` with an explicit timestamp
///
/// Walks `range`, never the extracted keys: APs missing from the records
/// get `-` values and no SSIDs, APs outside the range are dropped.
#[must_use]
pub fn aggregate_at(
    records: &ExtractedRecords,
    range: &ApRange,
    captured_at_epoch_seconds: i64,
) -> Snapshot {
    let access_points = range
        .ids()
        .map(|id| match records.radios.get(&id) {
            Some(radio) => {
                let ssids = radio
                    .ssid_names
                    .iter()
                    .map(|name| {
                        SsidView::new(
                            name.as_str(),
                            records.clients.count(&id, name),
                            records.capacities.get(name),
                        )
                    })
                    .collect();
                ApView::new(id, radio.channel.as_str(), radio.power_dbm.as_str(), ssids)
            }
            None => ApView::new(id, MISSING_VALUE, MISSING_VALUE, Vec::new()),
        })
        .collect();

    let unlisted = unlisted_aps(records, range);
    if !unlisted.is_empty() {
        tracing::debug!(aps = ?unlisted, "Reported access points outside the configured range");
    }

    Snapshot {
        captured_at_epoch_seconds,
        access_points,
        dhcp_utilization: records.dhcp_utilization,
    }
}

/// Access points in the listing that the snapshot leaves out
#[must_use]
pub fn unlisted_aps<'a>(records: &'a ExtractedRecords, range: &ApRange) -> Vec<&'a str> {
    records
        .radios
        .keys()
        .map(String::as_str)
        .filter(|id| !range.contains(id))
        .collect()
}

/// Snapshot served before the first cycle completes
#[must_use]
pub fn empty_snapshot(range: &ApRange) -> Snapshot {
    aggregate_at(&ExtractedRecords::default(), range, 0)
}

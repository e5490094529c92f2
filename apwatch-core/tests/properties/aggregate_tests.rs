//! Property-based tests for extraction and aggregation
//!
//! Transcripts are generated in the controller's listing layout, so the
//! extractor and the aggregator are exercised together.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use apwatch_core::extract::{ExtractSettings, Extractor};
use apwatch_core::snapshot::{ApRange, aggregate_at};
use apwatch_core::transcript::Transcript;
use proptest::prelude::*;

// ========== Strategies ==========

/// One generated AP row: number, channel, power, SSIDs
#[derive(Debug, Clone)]
struct ApRow {
    number: u32,
    channel: u8,
    power: u8,
    ssids: Vec<String>,
}

fn arb_ssid() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("corp".to_string()),
        Just("guest".to_string()),
        Just("iot".to_string()),
        "[a-z]{3,6}",
    ]
}

fn arb_row() -> impl Strategy<Value = ApRow> {
    (
        1u32..40,
        1u8..165,
        0u8..30,
        prop::collection::vec(arb_ssid(), 0..3),
    )
        .prop_map(|(number, channel, power, ssids)| ApRow {
            number,
            channel,
            power,
            ssids,
        })
}

fn arb_range() -> impl Strategy<Value = ApRange> {
    (1u32..10, 0u32..30).prop_map(|(first, len)| ApRange::new(first, first + len))
}

fn listing(rows: &[ApRow]) -> String {
    let mut text = String::from(
        "ap_01# show aps\n\nAll APs\n-------\n\
         Name   Group  IP Address  Type  IPv6  Flags  Clients  Uptime  ESSIDs  Outer IP  Channel  Power\n\
         ----   -----  ----------  ----  ----  -----  -------  ------  ------  --------  -------  -----\n",
    );
    for row in rows {
        let ssids = if row.ssids.is_empty() {
            "-".to_string()
        } else {
            row.ssids.join(",")
        };
        let _ = writeln!(
            text,
            "ap_{:02}  hq  10.0.0.{}  315  --  2  0  3d  {}  N/A  {}  {}",
            row.number, row.number, ssids, row.channel, row.power
        );
    }
    text.push_str("ap_01# exit\n");
    text
}

fn extractor() -> Extractor {
    Extractor::new(&ExtractSettings::default(), "ap_").unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // ========== Dense range ==========
    //
    // The snapshot lists exactly the configured ids in ascending order, no
    // matter which APs the devices reported.

    #[test]
    fn snapshot_is_dense_over_range(
        rows in prop::collection::vec(arb_row(), 0..20),
        range in arb_range(),
    ) {
        let transcript = Transcript::from_text("controller", listing(&rows));
        let records = extractor().extract_all(&transcript);
        let snapshot = aggregate_at(&records, &range, 0);

        let ids: Vec<String> = snapshot.access_points.iter().map(|ap| ap.id.clone()).collect();
        let expected: Vec<String> = range.ids().collect();
        prop_assert_eq!(ids.len(), range.len());
        prop_assert_eq!(ids, expected);
    }

    #[test]
    fn reported_aps_carry_their_radio_values(rows in prop::collection::vec(arb_row(), 1..20)) {
        let range = ApRange::new(1, 40);
        let transcript = Transcript::from_text("controller", listing(&rows));
        let snapshot = aggregate_at(&extractor().extract_all(&transcript), &range, 0);

        // Later rows for the same AP replace earlier ones
        let last_rows: BTreeMap<u32, &ApRow> = rows.iter().map(|r| (r.number, r)).collect();
        for ap in &snapshot.access_points {
            let number: u32 = ap.id.trim_start_matches("ap_").parse().unwrap();
            match last_rows.get(&number) {
                Some(row) => {
                    prop_assert_eq!(&ap.channel, &row.channel.to_string());
                    prop_assert_eq!(&ap.power_dbm, &row.power.to_string());
                }
                None => {
                    prop_assert_eq!(ap.channel.as_str(), "-");
                    prop_assert!(ap.ssids.is_empty());
                    prop_assert_eq!(ap.level, 0);
                }
            }
        }
    }

    // ========== Idempotent extraction ==========
    //
    // Extraction is a pure function of the transcript text.

    #[test]
    fn extraction_is_idempotent(
        rows in prop::collection::vec(arb_row(), 0..20),
        noise in prop::collection::vec("[ -~]{0,40}", 0..10),
    ) {
        let mut text = listing(&rows);
        for line in &noise {
            text.push_str(line);
            text.push('\n');
        }
        let transcript = Transcript::from_text("controller", text);
        let range = ApRange::default();

        let first = aggregate_at(&extractor().extract_all(&transcript), &range, 1_700_000_000);
        let second = aggregate_at(&extractor().extract_all(&transcript), &range, 1_700_000_000);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn arbitrary_text_never_breaks_extraction(lines in prop::collection::vec("[ -~]{0,80}", 0..30)) {
        let transcript = Transcript::from_text("device", lines.join("\n"));
        let records = extractor().extract_all(&transcript);
        prop_assert!((0.0..=100.0).contains(&records.dhcp_utilization));

        let snapshot = aggregate_at(&records, &ApRange::default(), 0);
        prop_assert_eq!(snapshot.access_points.len(), 16);
        prop_assert!(snapshot.access_points.iter().all(|ap| ap.level <= 10));
    }
}

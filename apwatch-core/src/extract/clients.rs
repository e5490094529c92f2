//! Client list extraction
//!
//! The controller prints one row per associated station:
//!
//! ```text
//! Client List
//! -----------
//! Name      IP Address  MAC Address        OS      ESSID  Access Point  Channel  ...
//! ----      ----------  -----------        --      -----  ------------  -------  ...
//! phone-1   10.1.0.21   aa:bb:cc:00:00:01  iOS     corp   ap_01         6        ...
//! laptop 1  10.1.0.23   aa:bb:cc:00:00:03  Win 10  corp   ap_01         6        ...
//! ```
//!
//! Columns may contain single spaces, so rows are split on runs of two or
//! more spaces. An empty column merges two separators and shifts the
//! fields after it; such a row no longer has an access point in its AP
//! column and is skipped. The list ends at the first blank line.

use std::sync::LazyLock;

use regex::Regex;

use super::records::ClientCounts;
use super::section::CommandSection;
use super::settings::ExtractSettings;
use super::{Extraction, ParseAnomaly};

/// Cached regex for client row columns: two or more whitespace characters
static COLUMN_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s{2,}").expect("COLUMN_SEPARATOR is a valid regex pattern")
});

const SECTION: &str = "client list";

/// Tallies client rows per `(access point, ssid)`
///
/// Rows whose access point column does not start with `ap_prefix` are
/// footer or summary lines and are skipped.
#[must_use]
pub fn extract_client_counts(
    lines: &[&str],
    settings: &ExtractSettings,
    ap_prefix: &str,
) -> Extraction<ClientCounts> {
    let mut counts = ClientCounts::new();
    let mut anomalies = Vec::new();
    let mut section = CommandSection::new();

    for (index, line) in lines.iter().enumerate() {
        if line.starts_with(&settings.client_list_marker) {
            section.enter();
            continue;
        }
        if !section.is_inside() {
            continue;
        }

        let position = section.advance();
        if line.trim().is_empty() {
            section.leave();
            continue;
        }
        if position <= settings.client_header_lines {
            continue;
        }

        let fields: Vec<&str> = COLUMN_SEPARATOR.split(line).collect();
        if fields.len() < settings.client_min_fields {
            anomalies.push(ParseAnomaly::new(
                SECTION,
                index + 1,
                format!("expected {} columns, found {}", settings.client_min_fields, fields.len()),
            ));
            continue;
        }

        let ssid = fields[settings.client_ssid_field].trim();
        let ap_id = fields[settings.client_ap_field].trim();
        if !ap_id.starts_with(ap_prefix) || ssid.is_empty() {
            continue;
        }
        counts.increment(ap_id, ssid);
    }

    Extraction::new(counts, anomalies)
}

//! Access point radio extraction from the AP listing

use std::collections::BTreeMap;

use regex::Regex;

use super::records::{ClientCounts, RadioRecord};
use super::section::CommandSection;
use super::settings::ExtractSettings;
use super::{Extraction, ParseAnomaly};

const SECTION: &str = "ap listing";

/// Radio records keyed by access point name
pub type RadioTable = BTreeMap<String, RadioRecord>;

/// Reads channel, power and SSID list for every AP row of the listing
///
/// `ap_row` must match the leading AP name of a data row and `prompt` a
/// shell prompt line. SSIDs that have clients on an AP according to
/// `clients` are appended to that AP's SSID list.
#[must_use]
pub fn extract_radios(
    lines: &[&str],
    settings: &ExtractSettings,
    ap_row: &Regex,
    prompt: &Regex,
    clients: &ClientCounts,
) -> Extraction<RadioTable> {
    let mut radios = RadioTable::new();
    let mut anomalies = Vec::new();
    let mut section = CommandSection::new();
    let min_fields = settings.radio_min_fields();

    for (index, line) in lines.iter().enumerate() {
        if line.contains(&settings.ap_command) {
            section.enter();
            continue;
        }
        if !section.is_inside() {
            continue;
        }
        if prompt.is_match(line) {
            section.leave();
            continue;
        }

        let position = section.advance();
        if position <= settings.radio_header_lines || !ap_row.is_match(line) {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < min_fields {
            anomalies.push(ParseAnomaly::new(
                SECTION,
                index + 1,
                format!("expected {min_fields} fields, found {}", fields.len()),
            ));
            continue;
        }

        let mut record = RadioRecord {
            ap_id: fields[0].to_string(),
            channel: fields[settings.channel_field].to_string(),
            power_dbm: fields[settings.power_field].to_string(),
            ssid_names: Vec::new(),
        };
        fields[settings.ssid_field]
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty() && *name != "-")
            .for_each(|name| record.add_ssid(name));
        radios.insert(record.ap_id.clone(), record);
    }

    for (ap_id, record) in &mut radios {
        for ssid in clients.ssids_for(ap_id) {
            record.add_ssid(ssid);
        }
    }

    Extraction::new(radios, anomalies)
}

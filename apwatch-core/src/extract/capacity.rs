//! SSID capacity extraction from the configuration audit
//!
//! ```text
//! ap_01# show amp-audit | include (ssid-profile|max-clients-threshold)
//! wlan ssid-profile corp
//!  max-clients-threshold 10
//!
//! wlan ssid-profile guest
//!  max-clients-threshold 5
//! ```

use regex::Regex;

use super::records::SsidCapacities;
use super::section::CommandSection;
use super::settings::ExtractSettings;
use super::{Extraction, ParseAnomaly};

const SECTION: &str = "capacity audit";

/// Collects the max-clients threshold of every SSID profile in the audit
#[must_use]
pub fn extract_capacities(
    lines: &[&str],
    settings: &ExtractSettings,
    prompt: &Regex,
) -> Extraction<SsidCapacities> {
    let mut capacities = SsidCapacities::new();
    let mut anomalies = Vec::new();
    let mut section = CommandSection::new();
    let mut profile: Option<String> = None;

    for (index, line) in lines.iter().enumerate() {
        if line.contains(&settings.audit_command) {
            section.enter();
            profile = None;
            continue;
        }
        if !section.is_inside() {
            continue;
        }
        if prompt.is_match(line) {
            section.leave();
            continue;
        }
        section.advance();

        let trimmed = line.trim();
        if trimmed.is_empty() {
            profile = None;
        } else if trimmed.starts_with(&settings.profile_marker) {
            profile = trimmed.split_whitespace().last().map(str::to_string);
        } else if trimmed.starts_with(&settings.threshold_marker) {
            let Some(ssid) = profile.as_deref() else {
                anomalies.push(ParseAnomaly::new(
                    SECTION,
                    index + 1,
                    "threshold outside an ssid profile",
                ));
                continue;
            };
            match trimmed.split_whitespace().nth(1).map(str::parse::<u32>) {
                Some(Ok(max_clients)) => capacities.insert(ssid, max_clients),
                _ => anomalies.push(ParseAnomaly::new(
                    SECTION,
                    index + 1,
                    format!("unparsable threshold '{trimmed}'"),
                )),
            }
        }
    }

    Extraction::new(capacities, anomalies)
}

//! DHCP pool utilization extraction from the switch

use std::sync::LazyLock;

use regex::Regex;

use super::section::CommandSection;
use super::settings::ExtractSettings;
use super::{Extraction, ParseAnomaly};

/// Cached regex for a percentage such as `37.50%` or `80 %`
static PERCENTAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]+(?:\.[0-9]+)?)\s*%").expect("PERCENTAGE is a valid regex pattern")
});

const SECTION: &str = "dhcp pool";

/// Reads the first pool utilization percentage, clamped to 0..=100
///
/// Yields `0.0` when the section or the utilization line is absent.
#[must_use]
pub fn extract_dhcp_utilization(
    lines: &[&str],
    settings: &ExtractSettings,
    prompt: &Regex,
) -> Extraction<f64> {
    let mut anomalies = Vec::new();
    let mut section = CommandSection::new();

    for (index, line) in lines.iter().enumerate() {
        if line.contains(&settings.dhcp_command) {
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
        section.advance();

        if !line.contains(&settings.utilization_marker) {
            continue;
        }
        let parsed = PERCENTAGE
            .captures(line)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok());
        match parsed {
            Some(value) => return Extraction::new(value.clamp(0.0, 100.0), anomalies),
            None => anomalies.push(ParseAnomaly::new(
                SECTION,
                index + 1,
                "utilization line without a percentage",
            )),
        }
    }

    Extraction::new(0.0, anomalies)
}

//! Transcript extraction pipeline
//!
//! Turns the captured console text of a cycle into typed records. Each
//! extractor is a small section-scoped state machine over the line
//! sequence (see [`CommandSection`]); they share nothing and can run in
//! any order. Extraction never fails: rows that do not fit are skipped and
//! reported as [`ParseAnomaly`] values, absent sections yield empty
//! results.
//!
//! # Example
//!
//! ```
//! use apwatch_core::extract::{ExtractSettings, Extractor};
//!
//! let extractor = Extractor::new(&ExtractSettings::default(), "ap_").unwrap();
//! let records = extractor.extract_lines(&["switch# show ip dhcp pool", " Pool utilization: 37.50%"]);
//! assert!((records.dhcp_utilization - 37.5).abs() < f64::EPSILON);
//! ```

mod capacity;
mod clients;
mod dhcp;
mod radio;
mod records;
mod section;
mod settings;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::error::{ConfigError, ConfigResult};
use crate::transcript::Transcript;

pub use capacity::extract_capacities;
pub use clients::extract_client_counts;
pub use dhcp::extract_dhcp_utilization;
pub use radio::{RadioTable, extract_radios};
pub use records::{ClientCounts, MISSING_VALUE, RadioRecord, SsidCapacities};
pub use section::CommandSection;
pub use settings::ExtractSettings;

/// A line an extractor recognized but could not use
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{section} line {line_no}: {reason}")]
pub struct ParseAnomaly {
    /// Extractor that reported the line
    pub section: &'static str,
    /// 1-based line number in the transcript
    pub line_no: usize,
    /// What was wrong with the line
    pub reason: String,
}

impl ParseAnomaly {
    /// Creates a new anomaly
    #[must_use]
    pub fn new(section: &'static str, line_no: usize, reason: impl Into<String>) -> Self {
        Self {
            section,
            line_no,
            reason: reason.into(),
        }
    }
}

/// Result of one extractor with the anomalies it skipped over
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction<T> {
    /// Extracted value, defaulted when nothing matched
    pub value: T,
    /// Lines skipped during extraction
    pub anomalies: Vec<ParseAnomaly>,
}

impl<T> Extraction<T> {
    /// Wraps a value and its anomalies
    #[must_use]
    pub const fn new(value: T, anomalies: Vec<ParseAnomaly>) -> Self {
        Self { value, anomalies }
    }
}

/// Everything extracted from one transcript
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractedRecords {
    /// Radio status keyed by AP name, including APs outside the display range
    pub radios: RadioTable,
    /// Client tally per AP and SSID
    pub clients: ClientCounts,
    /// Max clients per SSID
    pub capacities: SsidCapacities,
    /// DHCP pool utilization in percent
    pub dhcp_utilization: f64,
    /// Skipped lines from all extractors
    pub anomalies: Vec<ParseAnomaly>,
}

/// Runs the four extractors with compiled patterns
#[derive(Debug, Clone)]
pub struct Extractor {
    settings: ExtractSettings,
    ap_prefix: String,
    prompt: Regex,
    ap_row: Regex,
}

impl Extractor {
    /// Compiles the prompt and AP row patterns
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the settings are invalid.
    pub fn new(settings: &ExtractSettings, ap_prefix: &str) -> ConfigResult<Self> {
        settings.validate()?;
        let prompt = Regex::new(&settings.prompt_pattern).map_err(|e| {
            ConfigError::InvalidPattern {
                field: "extract.prompt_pattern".to_string(),
                pattern: settings.prompt_pattern.clone(),
                reason: e.to_string(),
            }
        })?;
        let row_pattern = format!(r"^{}\d+\s", regex::escape(ap_prefix));
        let ap_row = Regex::new(&row_pattern).map_err(|e| ConfigError::InvalidPattern {
            field: "access_points.prefix".to_string(),
            pattern: row_pattern.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            settings: settings.clone(),
            ap_prefix: ap_prefix.to_string(),
            prompt,
            ap_row,
        })
    }

    /// Settings this extractor was built from
    #[must_use]
    pub const fn settings(&self) -> &ExtractSettings {
        &self.settings
    }

    /// Extracts all records from a cycle transcript
    #[must_use]
    pub fn extract_all(&self, transcript: &Transcript) -> ExtractedRecords {
        let lines = transcript.lines();
        self.extract_lines(&lines)
    }

    /// Extracts all records from an already split line sequence
    #[must_use]
    pub fn extract_lines(&self, lines: &[&str]) -> ExtractedRecords {
        let _span = tracing::debug_span!(crate::tracing::span_names::EXTRACT, lines = lines.len())
            .entered();

        let clients = extract_client_counts(lines, &self.settings, &self.ap_prefix);
        let radios = extract_radios(
            lines,
            &self.settings,
            &self.ap_row,
            &self.prompt,
            &clients.value,
        );
        let capacities = extract_capacities(lines, &self.settings, &self.prompt);
        let dhcp = extract_dhcp_utilization(lines, &self.settings, &self.prompt);

        let anomalies: Vec<ParseAnomaly> = radios
            .anomalies
            .into_iter()
            .chain(clients.anomalies)
            .chain(capacities.anomalies)
            .chain(dhcp.anomalies)
            .collect();
        for anomaly in &anomalies {
            tracing::debug!(%anomaly, "Skipped transcript line");
        }

        tracing::debug!(
            radios = radios.value.len(),
            clients = clients.value.total(),
            capacities = capacities.value.len(),
            dhcp_utilization = dhcp.value,
            anomalies = anomalies.len(),
            "Transcript extracted"
        );

        ExtractedRecords {
            radios: radios.value,
            clients: clients.value,
            capacities: capacities.value,
            dhcp_utilization: dhcp.value,
            anomalies,
        }
    }
}

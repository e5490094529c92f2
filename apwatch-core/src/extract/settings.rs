//! Extraction settings
//!
//! Device CLI output is free text that shifts between firmware versions.
//! Column positions, header sizes and section markers are therefore
//! configuration (`[extract]` in `config.toml`) rather than constants, so
//! they can be checked against real output with `apwatch parse`.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Section markers and column layout for the four extractors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractSettings {
    /// Regex matching a shell prompt line; ends command sections
    pub prompt_pattern: String,

    /// Echo of the access-point listing command
    pub ap_command: String,
    /// Lines skipped after the AP listing echo before rows start
    pub radio_header_lines: usize,
    /// Whitespace-separated field holding the channel
    pub channel_field: usize,
    /// Whitespace-separated field holding the transmit power
    pub power_field: usize,
    /// Whitespace-separated field holding the comma-separated SSID list
    pub ssid_field: usize,

    /// Line prefix that opens the client list
    pub client_list_marker: String,
    /// Lines skipped after the client list title before rows start
    pub client_header_lines: usize,
    /// Column (split on 2+ spaces) holding the ESSID
    pub client_ssid_field: usize,
    /// Column (split on 2+ spaces) holding the access point name
    pub client_ap_field: usize,
    /// Minimum number of columns for a client row
    pub client_min_fields: usize,

    /// Echo of the configuration audit command
    pub audit_command: String,
    /// Line prefix naming the SSID profile a threshold belongs to
    pub profile_marker: String,
    /// Line prefix carrying the max clients threshold
    pub threshold_marker: String,

    /// Echo of the DHCP pool command on the switch
    pub dhcp_command: String,
    /// Line prefix carrying the pool utilization percentage
    pub utilization_marker: String,
}

impl Default for ExtractSettings {
    fn default() -> Self {
        Self {
            prompt_pattern: r"^[\w.\-()]+[#>]".to_string(),
            ap_command: "show aps".to_string(),
            radio_header_lines: 5,
            channel_field: 10,
            power_field: 11,
            ssid_field: 8,
            client_list_marker: "Client List".to_string(),
            client_header_lines: 3,
            client_ssid_field: 4,
            client_ap_field: 5,
            client_min_fields: 7,
            audit_command: "show amp-audit".to_string(),
            profile_marker: "wlan ssid-profile".to_string(),
            threshold_marker: "max-clients-threshold".to_string(),
            dhcp_command: "show ip dhcp pool".to_string(),
            utilization_marker: "Pool utilization".to_string(),
        }
    }
}

impl ExtractSettings {
    /// Minimum whitespace-separated field count for an AP row
    #[must_use]
    pub fn radio_min_fields(&self) -> usize {
        self.channel_field
            .max(self.power_field)
            .max(self.ssid_field)
            + 1
    }

    /// Checks that markers are present and the prompt pattern compiles
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` naming the first offending field.
    pub fn validate(&self) -> ConfigResult<()> {
        regex::Regex::new(&self.prompt_pattern).map_err(|e| ConfigError::InvalidPattern {
            field: "extract.prompt_pattern".to_string(),
            pattern: self.prompt_pattern.clone(),
            reason: e.to_string(),
        })?;

        let markers = [
            ("extract.ap_command", &self.ap_command),
            ("extract.client_list_marker", &self.client_list_marker),
            ("extract.audit_command", &self.audit_command),
            ("extract.profile_marker", &self.profile_marker),
            ("extract.threshold_marker", &self.threshold_marker),
            ("extract.dhcp_command", &self.dhcp_command),
            ("extract.utilization_marker", &self.utilization_marker),
        ];
        for (field, value) in markers {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation {
                    field: field.to_string(),
                    reason: "marker cannot be empty".to_string(),
                });
            }
        }

        if self.client_min_fields <= self.client_ssid_field.max(self.client_ap_field) {
            return Err(ConfigError::Validation {
                field: "extract.client_min_fields".to_string(),
                reason: "must exceed the ESSID and access point columns".to_string(),
            });
        }

        Ok(())
    }
}

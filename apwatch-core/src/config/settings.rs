//! Application settings (`config.toml`)

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::device::DeviceConfig;
use crate::error::{ConfigError, ConfigResult};
use crate::extract::ExtractSettings;
use crate::poller::effective_interval;
use crate::snapshot::ApRange;
use crate::tracing::{TracingConfig, TracingLevel, TracingOutput};

const fn default_interval_secs() -> u64 {
    60
}

fn default_bind() -> String {
    "0.0.0.0:5001".to_string()
}

const fn default_true() -> bool {
    true
}

/// `[poller]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollerSettings {
    /// Seconds between cycle triggers
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

impl PollerSettings {
    /// Interval clamped to the accepted range
    #[must_use]
    pub fn effective_interval(&self) -> Duration {
        effective_interval(self.interval_secs)
    }
}

/// `[server]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Listen address of the WebSocket push server
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// `[transcript]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptSettings {
    /// Whether cycle transcripts are written at all
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Target file, rewritten every cycle
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for TranscriptSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

impl TranscriptSettings {
    /// Configured path, or `apwatch/transcript.log` in the local data dir
    #[must_use]
    pub fn effective_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .map_or_else(|| PathBuf::from("."), |dir| dir.join("apwatch"))
                .join("transcript.log")
        })
    }
}

/// `[logging]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Base level for the `apwatch` crates
    #[serde(default)]
    pub level: TracingLevel,
    /// Log file; stderr when unset
    #[serde(default)]
    pub file: Option<PathBuf>,
    /// Full `EnvFilter` directive, overrides `level`
    #[serde(default)]
    pub filter: Option<String>,
}

impl LoggingSettings {
    /// Builds the tracing configuration
    #[must_use]
    pub fn tracing_config(&self) -> TracingConfig {
        let output = self
            .file
            .clone()
            .map_or(TracingOutput::Stderr, |path| TracingOutput::File { path });
        let config = TracingConfig::new().with_level(self.level).with_output(output);
        match &self.filter {
            Some(filter) => config.with_filter(filter.clone()),
            None => config,
        }
    }
}

/// Whole configuration file
#[derive(Debug, Default, Deserialize)]
pub struct AppSettings {
    /// Cycle scheduling
    #[serde(default)]
    pub poller: PollerSettings,
    /// Push server
    #[serde(default)]
    pub server: ServerSettings,
    /// Transcript persistence
    #[serde(default)]
    pub transcript: TranscriptSettings,
    /// Logging
    #[serde(default)]
    pub logging: LoggingSettings,
    /// Access points shown in every snapshot
    #[serde(default)]
    pub access_points: ApRange,
    /// Transcript extraction layout
    #[serde(default)]
    pub extract: ExtractSettings,
    /// Devices polled in order
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
}

impl AppSettings {
    /// Checks the access point range and extraction settings
    ///
    /// This is all `apwatch parse` needs.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found.
    pub fn validate_extraction(&self) -> ConfigResult<()> {
        self.access_points.validate()?;
        self.extract.validate()
    }

    /// Checks every device and that device names are unique
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found.
    pub fn validate_devices(&self) -> ConfigResult<()> {
        if self.devices.is_empty() {
            return Err(ConfigError::Validation {
                field: "devices".to_string(),
                reason: "at least one device is required".to_string(),
            });
        }
        for (index, device) in self.devices.iter().enumerate() {
            device.validate()?;
            if self.devices[..index].iter().any(|d| d.name == device.name) {
                return Err(ConfigError::Validation {
                    field: format!("devices.{}", device.name),
                    reason: "duplicate device name".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Full validation before polling
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found.
    pub fn validate(&self) -> ConfigResult<()> {
        self.validate_extraction()?;
        self.validate_devices()?;
        if self.server.bind.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "server.bind".to_string(),
                reason: "bind address cannot be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Resolves every device address
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Unresolvable` for the first device that does
    /// not resolve.
    pub fn resolve_devices(&self) -> ConfigResult<()> {
        for device in &self.devices {
            device.resolve()?;
        }
        Ok(())
    }
}

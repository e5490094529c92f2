//! Configuration file lookup and loading

use std::path::{Path, PathBuf};

use super::settings::AppSettings;
use crate::error::{ConfigError, ConfigResult};

/// Environment variable overriding the configuration path
pub const CONFIG_ENV: &str = "APWATCH_CONFIG";

/// File name inside the configuration directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Locates and loads `config.toml`
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    /// Uses an explicit path
    #[must_use]
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Resolves the path: `explicit`, then `$APWATCH_CONFIG`, then
    /// `<config dir>/apwatch/config.toml`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if no path is given and the platform has
    /// no configuration directory.
    pub fn resolve(explicit: Option<&Path>) -> ConfigResult<Self> {
        if let Some(path) = explicit {
            return Ok(Self::with_path(path));
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::with_path(path));
        }
        dirs::config_dir()
            .map(|dir| Self::with_path(dir.join("apwatch").join(CONFIG_FILE_NAME)))
            .ok_or_else(|| ConfigError::Io {
                path: PathBuf::from(CONFIG_FILE_NAME),
                reason: "no configuration directory on this platform".to_string(),
            })
    }

    /// Path that [`ConfigManager::load`] reads
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and parses the configuration file
    ///
    /// Only parsing happens here; call [`AppSettings::validate`] or one of
    /// the narrower checks before use.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read and
    /// `ConfigError::Parse` if it is not valid.
    pub fn load(&self) -> ConfigResult<AppSettings> {
        let _span = tracing::debug_span!(
            crate::tracing::span_names::CONFIG_LOAD,
            path = %self.path.display()
        )
        .entered();

        let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::Io {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        let settings = Self::from_toml_str(&content)?;
        tracing::debug!(devices = settings.devices.len(), "Configuration loaded");
        Ok(settings)
    }

    /// Parses configuration text
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` with the TOML error message.
    pub fn from_toml_str(content: &str) -> ConfigResult<AppSettings> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

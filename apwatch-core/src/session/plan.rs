//! Compiled per-device session plan

use std::time::Duration;

use regex::Regex;
use secrecy::{ExposeSecret, SecretString};

use crate::automation::ExpectEngine;
use crate::config::DeviceConfig;
use crate::config::device::compile;
use crate::error::{ConfigError, ConfigResult};

/// Everything a session needs, with patterns compiled once at startup
#[derive(Debug)]
pub struct SessionPlan {
    /// Device name
    pub name: String,
    /// Host name or address
    pub host: String,
    /// Console port
    pub port: u16,
    /// Login name, empty for password-only consoles
    pub username: String,
    /// Login password
    pub password: SecretString,
    /// Commands issued in order after login
    pub commands: Vec<String>,
    /// Command sent after the last command
    pub logout_command: String,
    /// Shell prompt at the end of the receive buffer
    pub prompt: Regex,
    /// Rejected login
    pub failure: Regex,
    /// Login cue rules
    pub login_rules: ExpectEngine,
    /// Login failures tolerated before giving up
    pub max_login_attempts: u32,
    /// TCP connect deadline
    pub connect_timeout: Duration,
    /// Deadline between two cue matches
    pub idle_timeout: Duration,
    /// Deadline for the whole session
    pub session_timeout: Duration,
}

impl SessionPlan {
    /// Validates a device configuration and compiles its patterns
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the device is invalid.
    pub fn compile(device: &DeviceConfig) -> ConfigResult<Self> {
        device.validate()?;
        let field = |name: &str| format!("devices.{}.{name}", device.name);

        let login_rules = ExpectEngine::from_rules(device.login_rules.clone()).map_err(|e| {
            ConfigError::Validation {
                field: field("login_rules"),
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            name: device.name.clone(),
            host: device.host.clone(),
            port: device.port,
            username: device.username.clone().unwrap_or_default(),
            password: SecretString::from(device.password.expose_secret().to_owned()),
            commands: device.commands.clone(),
            logout_command: device.logout_command.clone(),
            prompt: compile(&field("prompt_pattern"), &device.prompt_pattern)?,
            failure: compile(&field("failure_pattern"), &device.failure_pattern)?,
            login_rules,
            max_login_attempts: device.max_login_attempts,
            connect_timeout: device.connect_timeout(),
            idle_timeout: device.idle_timeout(),
            session_timeout: device.session_timeout(),
        })
    }
}

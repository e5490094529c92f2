//! Per-device console settings

use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use regex::Regex;
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

use crate::automation::{ExpectRule, default_login_rules};
use crate::error::{ConfigError, ConfigResult};
use crate::protocol::DEFAULT_TELNET_PORT;

/// Bounds for every device timeout, in seconds
pub const TIMEOUT_RANGE_SECS: std::ops::RangeInclusive<u64> = 1..=600;

const fn default_port() -> u16 {
    DEFAULT_TELNET_PORT
}

fn default_logout_command() -> String {
    "exit".to_string()
}

fn default_prompt_pattern() -> String {
    r"[\w.\-()]+[#>]\s*$".to_string()
}

fn default_failure_pattern() -> String {
    r"(?i)(invalid|incorrect|fail)".to_string()
}

const fn default_max_login_attempts() -> u32 {
    3
}

const fn default_connect_timeout_secs() -> u64 {
    10
}

const fn default_idle_timeout_secs() -> u64 {
    20
}

const fn default_session_timeout_secs() -> u64 {
    120
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

fn empty_secret() -> SecretString {
    SecretString::from(String::new())
}

/// One polled device (`[[devices]]` in `config.toml`)
#[derive(Debug, Deserialize)]
pub struct DeviceConfig {
    /// Name used in logs and transcript headers
    pub name: String,
    /// Host name or address
    pub host: String,
    /// Console port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Login name; `None` for password-only consoles
    #[serde(default)]
    pub username: Option<String>,
    /// Login password
    #[serde(default = "empty_secret", deserialize_with = "deserialize_secret")]
    pub password: SecretString,
    /// Commands issued in order after login
    #[serde(default)]
    pub commands: Vec<String>,
    /// Command sent once all commands ran
    #[serde(default = "default_logout_command")]
    pub logout_command: String,
    /// Regex matching the shell prompt at the end of the receive buffer
    #[serde(default = "default_prompt_pattern")]
    pub prompt_pattern: String,
    /// Regex matching a rejected login
    #[serde(default = "default_failure_pattern")]
    pub failure_pattern: String,
    /// Cue rules answering the login dialogue
    #[serde(default = "default_login_rules")]
    pub login_rules: Vec<ExpectRule>,
    /// Login failures tolerated before giving up
    #[serde(default = "default_max_login_attempts")]
    pub max_login_attempts: u32,
    /// Seconds allowed for the TCP connect
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Seconds allowed between two cue matches
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    /// Seconds allowed for the whole session
    #[serde(default = "default_session_timeout_secs")]
    pub session_timeout_secs: u64,
}

impl DeviceConfig {
    /// Creates a device with default login rules and timeouts
    #[must_use]
    pub fn new(name: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port: default_port(),
            username: None,
            password: empty_secret(),
            commands: Vec::new(),
            logout_command: default_logout_command(),
            prompt_pattern: default_prompt_pattern(),
            failure_pattern: default_failure_pattern(),
            login_rules: default_login_rules(),
            max_login_attempts: default_max_login_attempts(),
            connect_timeout_secs: default_connect_timeout_secs(),
            idle_timeout_secs: default_idle_timeout_secs(),
            session_timeout_secs: default_session_timeout_secs(),
        }
    }

    /// Sets the console port
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the credentials
    #[must_use]
    pub fn with_credentials(mut self, username: Option<String>, password: SecretString) -> Self {
        self.username = username;
        self.password = password;
        self
    }

    /// Sets the command list
    #[must_use]
    pub fn with_commands<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.commands = commands.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the prompt pattern
    #[must_use]
    pub fn with_prompt_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.prompt_pattern = pattern.into();
        self
    }

    /// Replaces the login rules
    #[must_use]
    pub fn with_login_rules(mut self, rules: Vec<ExpectRule>) -> Self {
        self.login_rules = rules;
        self
    }

    /// Sets the connect, idle and overall timeouts in seconds
    #[must_use]
    pub const fn with_timeouts(mut self, connect: u64, idle: u64, session: u64) -> Self {
        self.connect_timeout_secs = connect;
        self.idle_timeout_secs = idle;
        self.session_timeout_secs = session;
        self
    }

    /// Connect timeout, clamped to [`TIMEOUT_RANGE_SECS`]
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        clamp_timeout(self.connect_timeout_secs)
    }

    /// Idle timeout, clamped to [`TIMEOUT_RANGE_SECS`]
    #[must_use]
    pub fn idle_timeout(&self) -> Duration {
        clamp_timeout(self.idle_timeout_secs)
    }

    /// Overall session timeout, clamped to [`TIMEOUT_RANGE_SECS`]
    #[must_use]
    pub fn session_timeout(&self) -> Duration {
        clamp_timeout(self.session_timeout_secs)
    }

    /// Checks names, patterns and limits
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` naming the first offending field.
    pub fn validate(&self) -> ConfigResult<()> {
        let field = |name: &str| format!("devices.{}.{name}", self.name);

        if self.name.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "devices.name".to_string(),
                reason: "device name cannot be empty".to_string(),
            });
        }
        if self.host.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: field("host"),
                reason: "host cannot be empty".to_string(),
            });
        }
        if self.port == 0 {
            return Err(ConfigError::Validation {
                field: field("port"),
                reason: "port must be non-zero".to_string(),
            });
        }
        if self.max_login_attempts == 0 {
            return Err(ConfigError::Validation {
                field: field("max_login_attempts"),
                reason: "at least one login attempt is required".to_string(),
            });
        }
        if self.logout_command.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: field("logout_command"),
                reason: "logout command cannot be empty".to_string(),
            });
        }

        compile(&field("prompt_pattern"), &self.prompt_pattern)?;
        compile(&field("failure_pattern"), &self.failure_pattern)?;
        for rule in &self.login_rules {
            rule.compile_pattern()
                .map_err(|e| ConfigError::InvalidPattern {
                    field: field("login_rules"),
                    pattern: rule.pattern.clone(),
                    reason: e.to_string(),
                })?;
        }
        Ok(())
    }

    /// Resolves `host:port` to socket addresses
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Unresolvable` if the lookup fails or yields
    /// nothing.
    pub fn resolve(&self) -> ConfigResult<Vec<SocketAddr>> {
        let addrs: Vec<SocketAddr> = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| ConfigError::Unresolvable {
                host: self.host.clone(),
                reason: e.to_string(),
            })?
            .collect();
        if addrs.is_empty() {
            return Err(ConfigError::Unresolvable {
                host: self.host.clone(),
                reason: "no addresses returned".to_string(),
            });
        }
        Ok(addrs)
    }
}

fn clamp_timeout(secs: u64) -> Duration {
    Duration::from_secs(secs.clamp(*TIMEOUT_RANGE_SECS.start(), *TIMEOUT_RANGE_SECS.end()))
}

pub(crate) fn compile(field: &str, pattern: &str) -> ConfigResult<Regex> {
    Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
        field: field.to_string(),
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

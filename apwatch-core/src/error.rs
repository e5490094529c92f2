//! Error types for `apwatch`
//!
//! Each concern has its own error enum and result alias. Only
//! [`ConfigError`] is fatal: session, extraction and delivery failures are
//! contained where they happen and degrade the next snapshot instead.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("Failed to read configuration file {path}: {reason}")]
    Io {
        /// Path that failed to load
        path: PathBuf,
        /// Underlying I/O error message
        reason: String,
    },

    /// The configuration file is not valid TOML for the expected schema
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// A field holds a value outside its allowed range
    #[error("Invalid value for '{field}': {reason}")]
    Validation {
        /// Dotted path of the offending field
        field: String,
        /// What is wrong with it
        reason: String,
    },

    /// A configured regex pattern does not compile
    #[error("Invalid pattern for '{field}' ('{pattern}'): {reason}")]
    InvalidPattern {
        /// Dotted path of the offending field
        field: String,
        /// The pattern as written
        pattern: String,
        /// Compiler message
        reason: String,
    },

    /// A device address does not resolve to any socket address
    #[error("Cannot resolve device address '{host}': {reason}")]
    Unresolvable {
        /// Host as configured
        host: String,
        /// Resolver message
        reason: String,
    },
}

/// Result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Terminal failure of a single device session
///
/// A failed session still hands its partial transcript onward; this value
/// only records why the session ended early.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// No transport connection could be established in time
    #[error("Failed to connect to {host}:{port}: {reason}")]
    TransportConnectFailure {
        /// Device host
        host: String,
        /// Device port
        port: u16,
        /// Why the connect failed (refused, timed out, ...)
        reason: String,
    },

    /// The transport reported an error mid-session
    #[error("Transport error: {0}")]
    TransportError(String),

    /// No cue was matched before the idle or overall deadline
    #[error("Session timed out while {state}")]
    SessionTimeout {
        /// State the session was stuck in
        state: String,
    },

    /// The device rejected the credentials more often than allowed
    #[error("Login rejected after {attempts} attempt(s)")]
    LoginRejected {
        /// Number of failure cues seen
        attempts: u32,
    },

    /// The device closed the connection before logout
    #[error("Connection closed by device while {state}")]
    TransportClosed {
        /// State the session was in when the peer closed
        state: String,
    },
}

/// A subscriber could not be written to during fan-out
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeliveryError {
    /// The subscriber's channel is closed
    #[error("Subscriber {0} is closed")]
    Closed(uuid::Uuid),

    /// The snapshot could not be serialized
    #[error("Failed to serialize snapshot: {0}")]
    Serialize(String),
}

/// Top-level error for operations that cross module boundaries
#[derive(Debug, Error)]
pub enum ApWatchError {
    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Session error
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Tracing setup error
    #[error(transparent)]
    Tracing(#[from] crate::tracing::TracingError),

    /// Push server error
    #[error("Push server error: {0}")]
    Server(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

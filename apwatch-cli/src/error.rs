//! CLI error types and exit codes.

/// Exit codes for CLI operations
pub mod exit_codes {
    /// General error - configuration, validation, I/O or server errors
    pub const GENERAL_ERROR: i32 = 1;
    /// At least one device session failed during `poll`
    pub const DEVICE_FAILURE: i32 = 2;
}

/// CLI error type
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Logging could not be set up
    #[error("Logging error: {0}")]
    Logging(String),

    /// Async runtime or push server failure
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// One or more devices could not be polled
    #[error("Device failure: {0}")]
    DeviceFailure(String),

    /// Snapshot could not be serialized
    #[error("Output error: {0}")]
    Output(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<apwatch_core::ConfigError> for CliError {
    fn from(err: apwatch_core::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<apwatch_core::tracing::TracingError> for CliError {
    fn from(err: apwatch_core::tracing::TracingError) -> Self {
        Self::Logging(err.to_string())
    }
}

impl From<apwatch_core::ApWatchError> for CliError {
    fn from(err: apwatch_core::ApWatchError) -> Self {
        use apwatch_core::ApWatchError;
        match err {
            ApWatchError::Config(e) => e.into(),
            ApWatchError::Session(e) => Self::DeviceFailure(e.to_string()),
            ApWatchError::Tracing(e) => e.into(),
            ApWatchError::Server(e) => Self::Runtime(e),
            ApWatchError::Io(e) => Self::Io(e),
        }
    }
}

impl CliError {
    /// Returns the process exit code for this error.
    ///
    /// Exit codes:
    /// - 0: Success (not an error)
    /// - 1: General error (configuration, logging, runtime, output, IO)
    /// - 2: Device failure during `poll`
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::DeviceFailure(_) => exit_codes::DEVICE_FAILURE,
            Self::Config(_)
            | Self::Logging(_)
            | Self::Runtime(_)
            | Self::Output(_)
            | Self::Io(_) => exit_codes::GENERAL_ERROR,
        }
    }
}

//! Session states, events, actions and outcomes

use std::fmt;

use crate::error::SessionError;
use crate::protocol::format_command_line;

/// Position of a device session in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Transport not yet established
    Connecting,
    /// Connected; any login cue or the shell prompt is accepted
    LoggingIn,
    /// A login failure was seen; waiting for the device to ask again
    AwaitingUsernamePrompt,
    /// Username sent, waiting for the password cue
    AwaitingPasswordPrompt,
    /// Command `index` of the plan was sent
    ExecutingCommands {
        /// Index into the command list
        index: usize,
    },
    /// Logout command sent
    LoggingOut,
    /// Terminal
    Closed,
}

impl SessionState {
    /// Returns true while the login exchange is running
    #[must_use]
    pub const fn is_login(self) -> bool {
        matches!(
            self,
            Self::LoggingIn | Self::AwaitingUsernamePrompt | Self::AwaitingPasswordPrompt
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connecting => write!(f, "connecting"),
            Self::LoggingIn => write!(f, "logging in"),
            Self::AwaitingUsernamePrompt => write!(f, "awaiting username prompt"),
            Self::AwaitingPasswordPrompt => write!(f, "awaiting password prompt"),
            Self::ExecutingCommands { index } => write!(f, "executing command {}", index + 1),
            Self::LoggingOut => write!(f, "logging out"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// How a device session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// All commands ran and the session logged out
    Completed,
    /// The session ended early; its partial transcript is still kept
    Failed(SessionError),
}

impl SessionOutcome {
    /// Returns true for [`SessionOutcome::Completed`]
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// The failure, if any
    #[must_use]
    pub const fn error(&self) -> Option<&SessionError> {
        match self {
            Self::Completed => None,
            Self::Failed(err) => Some(err),
        }
    }
}

impl fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Failed(err) => write!(f, "failed: {err}"),
        }
    }
}

/// Input to the session state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The transport is established
    Connected,
    /// The transport could not be established
    ConnectFailed(String),
    /// A chunk of console text arrived
    Data(String),
    /// The idle or overall deadline fired
    Timeout,
    /// The transport failed mid-session
    TransportError(String),
    /// The peer closed the transport
    TransportClosed,
}

/// A line to write to the device
#[derive(Clone, PartialEq, Eq)]
pub struct Outgoing {
    text: String,
    sensitive: bool,
}

impl Outgoing {
    /// A line that may be logged
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sensitive: false,
        }
    }

    /// A line carrying a credential; never logged
    #[must_use]
    pub fn sensitive(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sensitive: true,
        }
    }

    /// Whether the line carries a credential
    #[must_use]
    pub const fn is_sensitive(&self) -> bool {
        self.sensitive
    }

    /// The line without terminator
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The line as written to the device, CR LF terminated
    #[must_use]
    pub fn to_wire(&self) -> String {
        format_command_line(&self.text)
    }
}

impl fmt::Debug for Outgoing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sensitive {
            f.write_str("Outgoing(<redacted>)")
        } else {
            f.debug_tuple("Outgoing").field(&self.text).finish()
        }
    }
}

/// Side effect requested by the state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Write a line to the device
    Send(Outgoing),
    /// Close the transport
    Close,
    /// The session is over
    Finish(SessionOutcome),
}

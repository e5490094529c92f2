//! Wire-level helpers for device consoles
//!
//! Consoles are a raw byte stream with no framing. Commands go out as ASCII
//! lines terminated by CR LF; incoming telnet negotiation is filtered by
//! [`TelnetFilter`] and the bytes are decoded by [`Utf8Decoder`] before the
//! text reaches the session state machine.

pub mod telnet;
mod text;

pub use telnet::{DEFAULT_TELNET_PORT, Filtered, TelnetFilter};
pub use text::Utf8Decoder;

/// Line terminator for everything sent to a device
pub const LINE_ENDING: &str = "\r\n";

/// Formats one command line as it is written to the device
#[must_use]
pub fn format_command_line(command: &str) -> String {
    format!("{command}{LINE_ENDING}")
}

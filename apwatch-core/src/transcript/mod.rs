//! Cycle transcripts
//!
//! A [`Transcript`] holds the console text of every device polled in one
//! cycle, in polling order, each segment tagged with its device and
//! outcome. It is built by the orchestrator, handed to a
//! [`TranscriptSink`], then consumed by extraction.

mod sink;

use std::fmt::Write as _;

use crate::session::SessionOutcome;

pub use sink::{FileTranscriptSink, NullTranscriptSink, TranscriptSink};

/// Captured console text of one device session
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceTranscript {
    /// Device name from the configuration
    pub device: String,
    /// How the session ended
    pub outcome: SessionOutcome,
    /// Every byte received, telnet negotiation removed
    pub text: String,
}

impl DeviceTranscript {
    /// Creates a device transcript
    #[must_use]
    pub fn new(device: impl Into<String>, outcome: SessionOutcome, text: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            outcome,
            text: text.into(),
        }
    }
}

/// Combined transcript of one polling cycle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    segments: Vec<DeviceTranscript>,
}

impl Transcript {
    /// Creates an empty transcript
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps raw text that was not captured by a session (e.g. a saved log)
    #[must_use]
    pub fn from_text(device: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            segments: vec![DeviceTranscript::new(device, SessionOutcome::Completed, text)],
        }
    }

    /// Appends the transcript of the next device
    pub fn push(&mut self, segment: DeviceTranscript) {
        self.segments.push(segment);
    }

    /// Device segments in polling order
    #[must_use]
    pub fn segments(&self) -> &[DeviceTranscript] {
        &self.segments
    }

    /// All lines of all segments, `\r` line endings removed
    #[must_use]
    pub fn lines(&self) -> Vec<&str> {
        self.segments
            .iter()
            .flat_map(|segment| segment.text.split('\n'))
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect()
    }

    /// Renders the transcript for persistence
    ///
    /// Every segment is introduced by a `=== <device> (<outcome>) ===`
    /// header line.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            let _ = writeln!(out, "=== {} ({}) ===", segment.device, segment.outcome);
            out.push_str(&segment.text);
            if !segment.text.ends_with('\n') {
                out.push('\n');
            }
        }
        out
    }
}

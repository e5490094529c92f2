//! Receive buffer scanned for cues

/// Text received since the last cue
///
/// Chunks are appended as they arrive; a matched cue clears the buffer so
/// the same text never triggers a second transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CueBuffer {
    text: String,
}

impl CueBuffer {
    /// Creates an empty buffer
    #[must_use]
    pub const fn new() -> Self {
        Self {
            text: String::new(),
        }
    }

    /// Appends a received chunk
    pub fn append(&mut self, chunk: &str) {
        self.text.push_str(chunk);
    }

    /// Unconsumed text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Drops everything
    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Drops the text up to byte offset `end`, keeping the rest for
    /// rescanning
    pub fn consume_through(&mut self, end: usize) {
        if end >= self.text.len() {
            self.text.clear();
        } else if self.text.is_char_boundary(end) {
            self.text.drain(..end);
        } else {
            self.text.clear();
        }
    }

    /// Returns true if nothing is buffered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

//! Command section tracking
//!
//! A command section starts at the echo of an issued command and ends at
//! the next prompt (or, for some outputs, the first blank line). Extractors
//! only look at lines inside their own section, so identical fragments in
//! the login banner or in another command's output are never parsed.

/// `outside` / `inside` state of one extractor, with a line counter that
/// restarts at every section entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandSection {
    inside: bool,
    line_no: usize,
}

impl CommandSection {
    /// Creates a tracker positioned outside any section
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inside: false,
            line_no: 0,
        }
    }

    /// Enters the section; the entry line itself is not counted
    pub fn enter(&mut self) {
        self.inside = true;
        self.line_no = 0;
    }

    /// Leaves the section
    pub fn leave(&mut self) {
        self.inside = false;
    }

    /// Whether the current line belongs to the section
    #[must_use]
    pub const fn is_inside(&self) -> bool {
        self.inside
    }

    /// Counts one more line and returns its 1-based position in the section
    pub fn advance(&mut self) -> usize {
        self.line_no += 1;
        self.line_no
    }
}

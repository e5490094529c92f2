//! Transcript persistence

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::Transcript;

/// Receives the combined transcript after every cycle
///
/// Failures are reported to the caller, which logs them; they never fail
/// the cycle.
#[async_trait]
pub trait TranscriptSink: Send + Sync {
    /// Persists one cycle transcript
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the transcript could not be stored.
    async fn persist(&self, transcript: &Transcript) -> std::io::Result<()>;
}

/// Rewrites a single file with the latest cycle transcript
#[derive(Debug, Clone)]
pub struct FileTranscriptSink {
    path: PathBuf,
}

impl FileTranscriptSink {
    /// Creates a sink writing to `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Target file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TranscriptSink for FileTranscriptSink {
    async fn persist(&self, transcript: &Transcript) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, transcript.render()).await?;
        tracing::debug!(path = %self.path.display(), "Transcript written");
        Ok(())
    }
}

/// Discards transcripts
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTranscriptSink;

#[async_trait]
impl TranscriptSink for NullTranscriptSink {
    async fn persist(&self, _transcript: &Transcript) -> std::io::Result<()> {
        Ok(())
    }
}

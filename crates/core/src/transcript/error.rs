use std::path::PathBuf;

use thiserror::Error;

use crate::platform::PlatformError;

/// Transcript generation and publication failures.
#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("could not read channel history: {0}")]
    HistoryReadFailed(#[from] PlatformError),

    #[error("could not write {}: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Published transcripts are never overwritten.
    #[error("transcript {0} already exists")]
    AlreadyExists(String),
}

impl TranscriptError {
    pub fn result_label(&self) -> &'static str {
        match self {
            TranscriptError::HistoryReadFailed(_) => "read_failed",
            TranscriptError::WriteFailed { .. } | TranscriptError::AlreadyExists(_) => {
                "write_failed"
            }
        }
    }
}

//! Mock transcript publisher for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::transcript::{
    numbered_filename, render_html, PublishedTranscript, TranscriptError, TranscriptPublisher,
    TranscriptRecord, MAX_NAME_ATTEMPTS,
};

/// Base URL of links handed out by the mock.
pub const MOCK_TRANSCRIPT_BASE: &str = "https://transcripts.test";

/// A transcript the mock accepted, with its rendered document.
#[derive(Debug, Clone)]
pub struct RecordedTranscript {
    /// Name it was published under.
    pub filename: String,
    pub record: TranscriptRecord,
    pub html: String,
}

/// Mock implementation of the TranscriptPublisher trait.
///
/// Keeps published transcripts in memory and can be told to fail every
/// publication until reset.
#[derive(Debug, Clone, Default)]
pub struct MockPublisher {
    published: Arc<RwLock<Vec<RecordedTranscript>>>,
    failing: Arc<RwLock<bool>>,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every publication fail (or succeed again).
    pub async fn set_failing(&self, failing: bool) {
        *self.failing.write().await = failing;
    }

    pub async fn published(&self) -> Vec<RecordedTranscript> {
        self.published.read().await.clone()
    }

    pub async fn publish_count(&self) -> usize {
        self.published.read().await.len()
    }
}

#[async_trait]
impl TranscriptPublisher for MockPublisher {
    async fn publish(
        &self,
        record: &TranscriptRecord,
    ) -> Result<PublishedTranscript, TranscriptError> {
        if *self.failing.read().await {
            return Err(TranscriptError::WriteFailed {
                path: record.filename().into(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            });
        }

        let mut published = self.published.write().await;
        let taken = |name: &str| published.iter().any(|p| p.filename == name);
        let Some(filename) = (1..=MAX_NAME_ATTEMPTS)
            .map(|attempt| numbered_filename(record.filename(), attempt))
            .find(|name| !taken(name))
        else {
            return Err(TranscriptError::AlreadyExists(record.filename().to_string()));
        };
        published.push(RecordedTranscript {
            filename: filename.clone(),
            record: record.clone(),
            html: render_html(record),
        });

        Ok(PublishedTranscript {
            url: format!("{}/transcripts/{}", MOCK_TRANSCRIPT_BASE, filename),
            filename,
        })
    }
}

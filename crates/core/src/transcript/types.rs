use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::platform::{Attachment, HistoryMessage};

/// Format of the timestamp embedded in transcript filenames.
pub const FILENAME_TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// One captured message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub timestamp: DateTime<Utc>,
    pub author: String,
    pub content: String,
    pub attachments: Vec<Attachment>,
}

impl From<HistoryMessage> for TranscriptEntry {
    fn from(message: HistoryMessage) -> Self {
        Self {
            timestamp: message.timestamp,
            author: message.author_display_name,
            content: message.content,
            attachments: message.attachments,
        }
    }
}

/// An immutable snapshot of a channel's history.
///
/// Fields are private so a record cannot change after generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptRecord {
    channel_name: String,
    generated_at: DateTime<Utc>,
    filename: String,
    entries: Vec<TranscriptEntry>,
}

impl TranscriptRecord {
    pub fn new(
        channel_name: impl Into<String>,
        generated_at: DateTime<Utc>,
        entries: Vec<TranscriptEntry>,
    ) -> Self {
        let channel_name = channel_name.into();
        let filename = transcript_filename(&channel_name, generated_at);
        Self {
            channel_name,
            generated_at,
            filename,
            entries,
        }
    }

    pub fn channel_name(&self) -> &str {
        &self.channel_name
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    /// `transcript-{channel}-{YYYYMMDD-HHMMSS}.html`
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Filename for a transcript of `channel_name` generated at `generated_at`.
///
/// Characters that could escape the transcripts directory are dropped.
pub fn transcript_filename(channel_name: &str, generated_at: DateTime<Utc>) -> String {
    let safe: String = channel_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    format!(
        "transcript-{}-{}.html",
        safe,
        generated_at.format(FILENAME_TIMESTAMP_FORMAT)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_filename_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            transcript_filename("trial_middleman-3", at),
            "transcript-trial_middleman-3-20240309-140507.html"
        );
    }

    #[test]
    fn test_filename_strips_path_characters() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            transcript_filename("../etc/passwd", at),
            "transcript-etcpasswd-20240101-000000.html"
        );
    }

    #[test]
    fn test_regeneration_gets_new_filename() {
        let first = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 1).unwrap();
        let a = TranscriptRecord::new("head_middleman-1", first, vec![]);
        let b = TranscriptRecord::new("head_middleman-1", second, vec![]);
        assert_ne!(a.filename(), b.filename());
        assert!(a.is_empty());
    }
}

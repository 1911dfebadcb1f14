use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::StreamExt;
use tracing::debug;

use super::{TranscriptEntry, TranscriptError, TranscriptRecord};
use crate::platform::{ChannelInfo, ChatPlatform};

/// Captures a channel's full history into a [`TranscriptRecord`].
pub struct TranscriptGenerator {
    platform: Arc<dyn ChatPlatform>,
}

impl TranscriptGenerator {
    pub fn new(platform: Arc<dyn ChatPlatform>) -> Self {
        Self { platform }
    }

    /// Read the whole history, oldest first, and snapshot it.
    ///
    /// The read has no page limit and no timeout.
    pub async fn generate(
        &self,
        channel: &ChannelInfo,
        generated_at: DateTime<Utc>,
    ) -> Result<TranscriptRecord, TranscriptError> {
        let mut history = self.platform.read_history(channel.id).await?;

        let mut entries = Vec::new();
        while let Some(message) = history.next().await {
            entries.push(TranscriptEntry::from(message?));
        }

        debug!(
            channel_id = %channel.id,
            messages = entries.len(),
            "Captured channel history"
        );
        Ok(TranscriptRecord::new(&channel.name, generated_at, entries))
    }
}

use serde::Serialize;

use crate::platform::{ChannelId, RoleId};
use crate::transcript::{PublishedTranscript, TranscriptError};

/// Whether a state-changing request actually changed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Applied,
    /// The ticket was already in the requested state.
    Unchanged,
}

/// Which surface asked for a transcript.
///
/// The text command also admits support roles; the buttons do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptTrigger {
    Control,
    Command,
}

/// Result of a completed deletion.
#[derive(Debug)]
pub struct DeleteOutcome {
    pub channel_id: ChannelId,
    pub channel_name: String,
    /// Deletion never waits on this succeeding.
    pub transcript: Result<PublishedTranscript, TranscriptError>,
}

/// Outcome of one setup step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum SetupStep {
    Created,
    AlreadyPresent,
    Failed(String),
}

impl SetupStep {
    pub fn is_failed(&self) -> bool {
        matches!(self, SetupStep::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleOutcome {
    pub name: String,
    pub role: Option<RoleId>,
    pub step: SetupStep,
}

/// What setup did. `None` marks a step that was never attempted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SetupReport {
    pub roles: Vec<RoleOutcome>,
    pub category: Option<SetupStep>,
    pub transcripts_channel: Option<SetupStep>,
    pub transcripts_channel_id: Option<ChannelId>,
}

impl SetupReport {
    /// Category and transcripts channel both exist.
    pub fn is_complete(&self) -> bool {
        matches!(
            self.category,
            Some(SetupStep::Created | SetupStep::AlreadyPresent)
        ) && matches!(
            self.transcripts_channel,
            Some(SetupStep::Created | SetupStep::AlreadyPresent)
        )
    }

    /// Human-readable summary, one line per notable step.
    pub fn summary(&self, category_name: &str) -> String {
        let mut lines = Vec::new();

        for role in &self.roles {
            if let SetupStep::Failed(e) = &role.step {
                lines.push(format!("Failed to create {}: {}", role.name, e));
            }
        }

        match &self.category {
            Some(SetupStep::Created) => {
                lines.push(format!("Created ticket category: {}", category_name))
            }
            Some(SetupStep::Failed(e)) => {
                lines.push(format!("Failed to create category: {}", e));
                return lines.join("\n");
            }
            _ => {}
        }

        match &self.transcripts_channel {
            Some(SetupStep::Created) => {
                let link = self
                    .transcripts_channel_id
                    .map(|id| id.mention())
                    .unwrap_or_default();
                lines.push(format!("Created transcripts channel: {}", link));
            }
            Some(SetupStep::Failed(e)) => {
                lines.push(format!("Failed to create transcripts channel: {}", e));
                return lines.join("\n");
            }
            _ => {}
        }

        let roles: Vec<String> = self
            .roles
            .iter()
            .filter_map(|r| match (&r.step, r.role) {
                (SetupStep::Created, Some(id)) => Some(id.mention()),
                (SetupStep::AlreadyPresent, _) => Some(format!("@{} (exists)", r.name)),
                _ => None,
            })
            .collect();
        lines.push(format!(
            "Ticket system setup complete!\nRoles: {}\nAssign these roles to your middleman team.",
            roles.join(", ")
        ));
        lines.join("\n")
    }
}

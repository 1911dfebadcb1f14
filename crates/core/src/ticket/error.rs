//! Errors surfaced to the actor that triggered a ticket operation.

use thiserror::Error;

use crate::platform::{ActorId, PlatformError};
use crate::ticket::{TicketStoreError, TicketType};
use crate::transcript::TranscriptError;

/// Ticket operation failures.
///
/// Display strings are the short messages shown to the actor.
#[derive(Debug, Error)]
pub enum TicketError {
    /// The ticket category does not exist yet.
    #[error("Ticket system not configured. {0}")]
    Configuration(String),

    #[error("Invalid ticket type selected.")]
    InvalidSelection(String),

    #[error("{reason}")]
    UnresolvedCounterparty { input: String, reason: String },

    #[error("A tip is required for {0} tickets.")]
    TipRequired(TicketType),

    #[error("Couldn't find member {0} in this server.")]
    UnknownMember(ActorId),

    #[error("Not a ticket channel.")]
    NotATicket,

    #[error("You don't have permission.")]
    PermissionDenied,

    #[error("Failed to generate transcript: {0}")]
    TranscriptGenerationFailed(#[from] TranscriptError),

    #[error("Platform operation failed: {0}")]
    PlatformOperationFailed(#[from] PlatformError),

    #[error("Channel name must contain at least one letter, digit, hyphen or underscore.")]
    InvalidName(String),

    #[error("{0}")]
    Store(#[from] TicketStoreError),
}

impl TicketError {
    pub fn non_numeric_counterparty(input: &str) -> Self {
        TicketError::UnresolvedCounterparty {
            input: input.to_string(),
            reason: "Invalid user ID format. Please provide a numeric Discord ID.".to_string(),
        }
    }

    pub fn counterparty_not_in_guild(input: &str) -> Self {
        TicketError::UnresolvedCounterparty {
            input: input.to_string(),
            reason: "Couldn't find that user in this server.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_short_and_human() {
        assert_eq!(TicketError::NotATicket.to_string(), "Not a ticket channel.");
        assert_eq!(
            TicketError::PermissionDenied.to_string(),
            "You don't have permission."
        );
        assert_eq!(
            TicketError::non_numeric_counterparty("bob").to_string(),
            "Invalid user ID format. Please provide a numeric Discord ID."
        );
        assert_eq!(
            TicketError::TipRequired(TicketType::HeadMiddleman).to_string(),
            "A tip is required for head_middleman tickets."
        );
    }

    #[test]
    fn test_platform_errors_convert() {
        let err: TicketError = PlatformError::Forbidden("manage channels".to_string()).into();
        assert_eq!(
            err.to_string(),
            "Platform operation failed: missing permission: manage channels"
        );
    }
}

//! Testing utilities and mock implementations.
//!
//! This module provides in-memory implementations of the collaborator
//! traits, so the whole ticket workflow can run without a live gateway.
//!
//! # Example
//!
//! ```rust,ignore
//! use middleman_core::testing::{fixtures, MockPublisher};
//!
//! let guild = fixtures::test_guild().await;
//! let publisher = MockPublisher::new();
//!
//! // Build a LifecycleController over guild.platform and publisher...
//! ```

mod mock_platform;
mod mock_publisher;

pub use mock_platform::{MockOperation, MockPlatform, RecordedPost, BOT_NAME};
pub use mock_publisher::{MockPublisher, RecordedTranscript, MOCK_TRANSCRIPT_BASE};

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::{Duration, TimeZone, Utc};

    use super::MockPlatform;
    use crate::platform::{ActorId, Attachment, CategoryId, ChannelId, HistoryMessage, Member};
    use crate::ticket::{ServiceRequest, TicketType};

    /// Name of the auxiliary support role seeded into test guilds.
    pub const SUPPORT_ROLE: &str = "Support Team";

    /// A guild with every role, the ticket category and a cast of members.
    pub struct TestGuild {
        pub platform: MockPlatform,
        pub category: CategoryId,
        pub transcripts_channel: ChannelId,
        /// Opens tickets.
        pub requester: ActorId,
        /// The other side of the trade.
        pub counterparty: ActorId,
        /// Holds the Head Middleman role.
        pub staff: ActorId,
        /// Holds only the support role.
        pub support: ActorId,
        /// Guild administrator without staff roles.
        pub admin: ActorId,
        /// A member with no relation to any ticket.
        pub outsider: ActorId,
    }

    /// Build the standard test guild.
    pub async fn test_guild() -> TestGuild {
        let platform = MockPlatform::new();
        for ticket_type in TicketType::ALL {
            platform.add_role(ticket_type.staff_role()).await;
        }
        platform.add_role(SUPPORT_ROLE).await;

        let category = platform.add_category("TICKETS").await;
        let transcripts_channel = platform
            .add_channel(Some(category), "ticket-transcripts")
            .await;

        let guild = TestGuild {
            platform,
            category,
            transcripts_channel,
            requester: ActorId(100),
            counterparty: ActorId(200),
            staff: ActorId(300),
            support: ActorId(400),
            admin: ActorId(500),
            outsider: ActorId(600),
        };

        let members = [
            Member::new(guild.requester, "alice"),
            Member::new(guild.counterparty, "bob"),
            Member::new(guild.staff, "mallory").with_role("Head Middleman"),
            Member::new(guild.support, "sam").with_role(SUPPORT_ROLE),
            Member::new(guild.admin, "root").with_administrator(),
            Member::new(guild.outsider, "olivia"),
        ];
        for member in members {
            guild.platform.add_member(member).await;
        }
        guild
    }

    /// A service request with the given tier and counterparty id.
    pub fn service_request(ticket_type: &str, counterparty_id: &str) -> ServiceRequest {
        ServiceRequest {
            ticket_type: ticket_type.to_string(),
            requester_offer: "100 gems".to_string(),
            counterparty_offer: "a rare pet".to_string(),
            counterparty_id: counterparty_id.to_string(),
            tip: None,
        }
    }

    /// A service request that carries a tip.
    pub fn service_request_with_tip(
        ticket_type: &str,
        counterparty_id: &str,
        tip: &str,
    ) -> ServiceRequest {
        ServiceRequest {
            tip: Some(tip.to_string()),
            ..service_request(ticket_type, counterparty_id)
        }
    }

    /// A history message `offset_secs` after a fixed epoch.
    pub fn history_message(author: &str, content: &str, offset_secs: i64) -> HistoryMessage {
        let epoch = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        HistoryMessage {
            timestamp: epoch + Duration::seconds(offset_secs),
            author_display_name: author.to_string(),
            content: content.to_string(),
            attachments: Vec::new(),
        }
    }

    /// A history message carrying one attachment.
    pub fn history_message_with_attachment(
        author: &str,
        content: &str,
        filename: &str,
        offset_secs: i64,
    ) -> HistoryMessage {
        let mut message = history_message(author, content, offset_secs);
        message.attachments.push(Attachment {
            filename: filename.to_string(),
            url: format!("https://cdn.example.com/{}", filename),
        });
        message
    }
}

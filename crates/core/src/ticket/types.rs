//! Core ticket data types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::platform::{ActorId, ChannelId};

// ============================================================================
// Ticket types
// ============================================================================

/// Middleman service tier. The set is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketType {
    TrialMiddleman,
    BeginnerMiddleman,
    AdvancedMiddleman,
    HeadMiddleman,
}

impl TicketType {
    pub const ALL: [TicketType; 4] = [
        TicketType::TrialMiddleman,
        TicketType::BeginnerMiddleman,
        TicketType::AdvancedMiddleman,
        TicketType::HeadMiddleman,
    ];

    /// Stable key, also used as the channel name prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketType::TrialMiddleman => "trial_middleman",
            TicketType::BeginnerMiddleman => "beginner_middleman",
            TicketType::AdvancedMiddleman => "advanced_middleman",
            TicketType::HeadMiddleman => "head_middleman",
        }
    }

    /// Name of the staff role serving this tier.
    pub fn staff_role(&self) -> &'static str {
        match self {
            TicketType::TrialMiddleman => "Trial Middleman",
            TicketType::BeginnerMiddleman => "Beginner Middleman",
            TicketType::AdvancedMiddleman => "Advanced Middleman",
            TicketType::HeadMiddleman => "Head Middleman",
        }
    }

    /// Label shown in the service-selection menu.
    pub fn panel_label(&self) -> &'static str {
        match self {
            TicketType::TrialMiddleman => "Trial Middleman - $25/6.5K Rbx and below",
            TicketType::BeginnerMiddleman => "Beginner Middleman - $50/13K Rbx and below",
            TicketType::AdvancedMiddleman => "Advanced Middleman - $100/25K Rbx and below",
            TicketType::HeadMiddleman => "Head Middleman - Above $100/25K Rbx",
        }
    }

    /// Low tiers accept requests without a tip.
    pub fn is_low_tier(&self) -> bool {
        matches!(
            self,
            TicketType::TrialMiddleman | TicketType::BeginnerMiddleman
        )
    }

    pub fn tip_required(&self) -> bool {
        !self.is_low_tier()
    }
}

impl fmt::Display for TicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognised ticket type key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTicketType(pub String);

impl fmt::Display for UnknownTicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown ticket type: {}", self.0)
    }
}

impl std::error::Error for UnknownTicketType {}

impl FromStr for TicketType {
    type Err = UnknownTicketType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TicketType::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| UnknownTicketType(s.to_string()))
    }
}

// ============================================================================
// Ticket state
// ============================================================================

/// Lifecycle state. A ticket that was never created has no state at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketState {
    Open,
    Closed,
    /// Terminal. Deleted tickets are struck from the store.
    Deleted,
}

impl TicketState {
    /// Whether `next` is a legal successor of this state.
    ///
    /// The only backward move is reopening a closed ticket.
    pub fn can_transition_to(&self, next: TicketState) -> bool {
        matches!(
            (self, next),
            (TicketState::Open, TicketState::Closed)
                | (TicketState::Open, TicketState::Deleted)
                | (TicketState::Closed, TicketState::Open)
                | (TicketState::Closed, TicketState::Deleted)
        )
    }

    pub fn state_type(&self) -> &'static str {
        match self {
            TicketState::Open => "open",
            TicketState::Closed => "closed",
            TicketState::Deleted => "deleted",
        }
    }
}

impl fmt::Display for TicketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.state_type())
    }
}

// ============================================================================
// Ticket
// ============================================================================

/// A provisioned ticket channel.
///
/// Explicit members are tracked by the membership registry, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Identity: the provisioned channel.
    pub channel_id: ChannelId,
    /// Current channel name (changes on rename).
    pub name: String,
    pub ticket_type: TicketType,
    /// Process-lifetime sequence number assigned at creation.
    pub sequence: u64,
    pub state: TicketState,
    pub requester: ActorId,
    pub counterparty: ActorId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Channel name for a new ticket.
pub fn channel_name_for(ticket_type: TicketType, sequence: u64) -> String {
    format!("{}-{}", ticket_type.as_str(), sequence)
}

// ============================================================================
// Service request
// ============================================================================

/// A submitted service request form, as received from the platform.
///
/// Consumed once by ticket creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRequest {
    /// Raw ticket type key from the selection menu.
    pub ticket_type: String,
    pub requester_offer: String,
    pub counterparty_offer: String,
    /// Raw counterparty id as typed by the requester.
    pub counterparty_id: String,
    #[serde(default)]
    pub tip: Option<String>,
}

impl ServiceRequest {
    /// The tip, if one was actually filled in.
    pub fn tip(&self) -> Option<&str> {
        self.tip
            .as_deref()
            .map(str::trim)
            .filter(|tip| !tip.is_empty())
    }

    /// Parse the counterparty id as typed.
    pub fn parsed_counterparty(&self) -> Option<ActorId> {
        self.counterparty_id.trim().parse::<u64>().ok().map(ActorId)
    }
}

// ============================================================================
// Request form
// ============================================================================

/// One input of the request form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormField {
    pub key: &'static str,
    pub label: &'static str,
    pub placeholder: &'static str,
    pub required: bool,
    pub long: bool,
}

/// Description of the request form shown after a tier is selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestForm {
    pub title: &'static str,
    pub ticket_type: TicketType,
    pub fields: Vec<FormField>,
}

impl RequestForm {
    pub fn for_type(ticket_type: TicketType) -> Self {
        let tip_label = if ticket_type.tip_required() {
            "Tip (required for trades $50+)"
        } else {
            "Tip (optional)"
        };

        Self {
            title: "Trade Information",
            ticket_type,
            fields: vec![
                FormField {
                    key: "requester_offer",
                    label: "What is your side of the trade?",
                    placeholder: "What you're offering...",
                    required: true,
                    long: true,
                },
                FormField {
                    key: "counterparty_offer",
                    label: "What is their side of the trade?",
                    placeholder: "What they're offering...",
                    required: true,
                    long: true,
                },
                FormField {
                    key: "counterparty_id",
                    label: "What is their user ID?",
                    placeholder: "Their Discord user ID...",
                    required: true,
                    long: false,
                },
                FormField {
                    key: "tip",
                    label: tip_label,
                    placeholder: "Tip amount (optional)...",
                    required: ticket_type.tip_required(),
                    long: false,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_type_round_trip_keys() {
        for ticket_type in TicketType::ALL {
            assert_eq!(ticket_type.as_str().parse::<TicketType>(), Ok(ticket_type));
        }
        assert!("vip_middleman".parse::<TicketType>().is_err());
        assert!("".parse::<TicketType>().is_err());
    }

    #[test]
    fn test_low_tiers() {
        assert!(TicketType::TrialMiddleman.is_low_tier());
        assert!(TicketType::BeginnerMiddleman.is_low_tier());
        assert!(TicketType::AdvancedMiddleman.tip_required());
        assert!(TicketType::HeadMiddleman.tip_required());
    }

    #[test]
    fn test_ticket_type_serialization() {
        let json = serde_json::to_string(&TicketType::HeadMiddleman).unwrap();
        assert_eq!(json, "\"head_middleman\"");
    }

    #[test]
    fn test_state_transitions() {
        use TicketState::*;
        assert!(Open.can_transition_to(Closed));
        assert!(Closed.can_transition_to(Open));
        assert!(Open.can_transition_to(Deleted));
        assert!(Closed.can_transition_to(Deleted));

        assert!(!Open.can_transition_to(Open));
        assert!(!Deleted.can_transition_to(Open));
        assert!(!Deleted.can_transition_to(Closed));
    }

    #[test]
    fn test_state_type_strings() {
        assert_eq!(TicketState::Open.state_type(), "open");
        assert_eq!(TicketState::Closed.to_string(), "closed");
        let json = serde_json::to_string(&TicketState::Deleted).unwrap();
        assert_eq!(json, "\"deleted\"");
    }

    #[test]
    fn test_channel_name_for() {
        assert_eq!(
            channel_name_for(TicketType::AdvancedMiddleman, 12),
            "advanced_middleman-12"
        );
    }

    #[test]
    fn test_service_request_tip_blank_is_none() {
        let mut request = ServiceRequest {
            ticket_type: "head_middleman".to_string(),
            requester_offer: "a".to_string(),
            counterparty_offer: "b".to_string(),
            counterparty_id: " 123 ".to_string(),
            tip: Some("   ".to_string()),
        };
        assert_eq!(request.tip(), None);
        assert_eq!(request.parsed_counterparty(), Some(ActorId(123)));

        request.tip = Some(" $5 ".to_string());
        assert_eq!(request.tip(), Some("$5"));

        request.counterparty_id = "@bob".to_string();
        assert_eq!(request.parsed_counterparty(), None);
    }

    #[test]
    fn test_request_form_tip_field() {
        let low = RequestForm::for_type(TicketType::TrialMiddleman);
        let tip = low.fields.iter().find(|f| f.key == "tip").unwrap();
        assert!(!tip.required);
        assert_eq!(tip.label, "Tip (optional)");

        let high = RequestForm::for_type(TicketType::HeadMiddleman);
        let tip = high.fields.iter().find(|f| f.key == "tip").unwrap();
        assert!(tip.required);
        assert_eq!(high.fields.len(), 4);
    }
}

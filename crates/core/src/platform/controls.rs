//! Interactive controls attached to posted messages.
//!
//! Every control has a stable custom id. Inbound activations are mapped back
//! to a [`ControlId`] through a fixed lookup table, never by handler name.

use serde::{Deserialize, Serialize};

/// Visual style of a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    Green,
    Red,
    Blurple,
    Grey,
    /// Not a button: a select menu.
    Menu,
}

/// Identity of an interactive control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlId {
    TicketTypeSelect,
    CloseTicket,
    GenerateTranscript,
    DeleteTicket,
    OpenTicket,
    GenerateTranscriptClosed,
    DeleteTicketClosed,
}

const CONTROL_TABLE: [(&str, ControlId); 7] = [
    ("ticket_type_select", ControlId::TicketTypeSelect),
    ("close_ticket", ControlId::CloseTicket),
    ("generate_transcript", ControlId::GenerateTranscript),
    ("delete_ticket", ControlId::DeleteTicket),
    ("open_ticket", ControlId::OpenTicket),
    ("generate_transcript_closed", ControlId::GenerateTranscriptClosed),
    ("delete_ticket_closed", ControlId::DeleteTicketClosed),
];

impl ControlId {
    /// Resolve an inbound custom id.
    pub fn from_custom_id(custom_id: &str) -> Option<Self> {
        CONTROL_TABLE
            .iter()
            .find(|(id, _)| *id == custom_id)
            .map(|(_, control)| *control)
    }

    pub fn custom_id(&self) -> &'static str {
        CONTROL_TABLE
            .iter()
            .find(|(_, control)| control == self)
            .map(|(id, _)| *id)
            .unwrap_or("unknown")
    }

    pub fn label(&self) -> &'static str {
        match self {
            ControlId::TicketTypeSelect => "Select middleman service needed...",
            ControlId::CloseTicket => "Close Ticket",
            ControlId::GenerateTranscript | ControlId::GenerateTranscriptClosed => "Transcript",
            ControlId::DeleteTicket | ControlId::DeleteTicketClosed => "Delete",
            ControlId::OpenTicket => "Open Ticket",
        }
    }

    pub fn style(&self) -> ButtonStyle {
        match self {
            ControlId::TicketTypeSelect => ButtonStyle::Menu,
            ControlId::CloseTicket => ButtonStyle::Red,
            ControlId::GenerateTranscript | ControlId::GenerateTranscriptClosed => {
                ButtonStyle::Blurple
            }
            ControlId::DeleteTicket | ControlId::DeleteTicketClosed => ButtonStyle::Grey,
            ControlId::OpenTicket => ButtonStyle::Green,
        }
    }
}

/// A group of controls posted together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlSet {
    /// The service-selection menu.
    ServicePanel,
    /// Close / transcript / delete on an open ticket.
    Lifecycle,
    /// Reopen / transcript / delete on a closed ticket.
    Closed,
}

impl ControlSet {
    pub fn controls(&self) -> &'static [ControlId] {
        match self {
            ControlSet::ServicePanel => &[ControlId::TicketTypeSelect],
            ControlSet::Lifecycle => &[
                ControlId::CloseTicket,
                ControlId::GenerateTranscript,
                ControlId::DeleteTicket,
            ],
            ControlSet::Closed => &[
                ControlId::OpenTicket,
                ControlId::GenerateTranscriptClosed,
                ControlId::DeleteTicketClosed,
            ],
        }
    }
}

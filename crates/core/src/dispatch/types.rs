use serde::Serialize;

use crate::platform::{ActorId, ChannelId};
use crate::ticket::{RequestForm, ServiceRequest};

/// Structured inbound events, as resolved by the gateway.
#[derive(Debug, Clone)]
pub enum InboundAction {
    /// A plain message. `direct` marks a direct message outside the guild.
    Message {
        channel: ChannelId,
        author: ActorId,
        content: String,
        direct: bool,
    },
    /// A button press or menu pick, by custom id.
    Control {
        channel: ChannelId,
        actor: ActorId,
        custom_id: String,
        values: Vec<String>,
    },
    /// A submitted service request form.
    FormSubmission {
        actor: ActorId,
        request: ServiceRequest,
    },
}

/// A message to send back to whoever triggered an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub content: String,
    /// Visible only to the triggering actor.
    pub ephemeral: bool,
}

impl Reply {
    pub fn public(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: false,
        }
    }

    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: true,
        }
    }
}

/// What the gateway should do after dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Reply(Reply),
    /// Show the request form for the chosen tier.
    ShowForm(RequestForm),
    /// Nothing to send.
    Ignore,
}

impl Outcome {
    pub fn reply(&self) -> Option<&Reply> {
        match self {
            Outcome::Reply(reply) => Some(reply),
            _ => None,
        }
    }
}

impl From<Reply> for Outcome {
    fn from(reply: Reply) -> Self {
        Outcome::Reply(reply)
    }
}

//! Data carried across the chat-platform boundary.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::controls::ControlSet;

macro_rules! snowflake {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

snowflake!(
    /// A platform user identity.
    ActorId
);
snowflake!(
    /// A text channel. Ticket identity is the id of its channel.
    ChannelId
);
snowflake!(
    /// A channel category (the ticket container).
    CategoryId
);
snowflake!(
    /// A guild role.
    RoleId
);

impl ActorId {
    /// Mention markup for this actor.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.0)
    }
}

impl ChannelId {
    /// Link markup for this channel.
    pub fn mention(&self) -> String {
        format!("<#{}>", self.0)
    }
}

impl RoleId {
    /// Mention markup for this role.
    pub fn mention(&self) -> String {
        format!("<@&{}>", self.0)
    }
}

/// A guild member as currently seen by the platform.
///
/// Role names are read live on every lookup; callers must not keep a
/// `Member` around across operations when making authorization decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: ActorId,
    pub display_name: String,
    #[serde(default)]
    pub roles: Vec<String>,
    /// Whether the member holds the guild administrator capability.
    #[serde(default)]
    pub administrator: bool,
}

impl Member {
    pub fn new(id: impl Into<ActorId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            roles: Vec::new(),
            administrator: false,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    pub fn with_administrator(mut self) -> Self {
        self.administrator = true;
        self
    }

    pub fn holds_role(&self, name: &str) -> bool {
        self.roles.iter().any(|r| r == name)
    }

    pub fn mention(&self) -> String {
        self.id.mention()
    }
}

/// Basic facts about a text channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub id: ChannelId,
    pub name: String,
    pub category: Option<CategoryId>,
}

/// Who a permission overwrite applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum OverwriteTarget {
    /// The guild's default role.
    Everyone,
    Role(RoleId),
    Member(ActorId),
}

/// Access granted by an overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    /// Can read and post.
    ReadWrite,
    /// Can read only.
    ReadOnly,
    /// Read and post both denied.
    Denied,
    /// Read plus channel management (the system actor).
    Manage,
}

impl Access {
    pub fn can_read(&self) -> bool {
        !matches!(self, Access::Denied)
    }

    pub fn can_write(&self) -> bool {
        matches!(self, Access::ReadWrite | Access::Manage)
    }
}

/// A single per-channel permission overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionOverwrite {
    pub target: OverwriteTarget,
    pub access: Access,
}

impl PermissionOverwrite {
    pub fn new(target: OverwriteTarget, access: Access) -> Self {
        Self { target, access }
    }

    pub fn read_write(target: OverwriteTarget) -> Self {
        Self::new(target, Access::ReadWrite)
    }

    pub fn denied(target: OverwriteTarget) -> Self {
        Self::new(target, Access::Denied)
    }
}

/// A file attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    pub url: String,
}

/// A message read back from channel history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub timestamp: DateTime<Utc>,
    pub author_display_name: String,
    /// Content with mentions already resolved to display text.
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// Accent colour of an embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbedColor {
    Blue,
    Green,
    Red,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
}

/// A rich notice attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<EmbedField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    pub color: EmbedColor,
}

impl Embed {
    pub fn new(title: impl Into<String>, color: EmbedColor) -> Self {
        Self {
            title: title.into(),
            description: None,
            fields: Vec::new(),
            footer: None,
            color,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }
}

/// A message to post into a channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed: Option<Embed>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controls: Option<ControlSet>,
}

impl OutgoingMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn embed(embed: Embed) -> Self {
        Self {
            embed: Some(embed),
            ..Default::default()
        }
    }

    pub fn controls(controls: ControlSet) -> Self {
        Self {
            controls: Some(controls),
            ..Default::default()
        }
    }

    pub fn with_embed(mut self, embed: Embed) -> Self {
        self.embed = Some(embed);
        self
    }

    pub fn with_controls(mut self, controls: ControlSet) -> Self {
        self.controls = Some(controls);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mentions() {
        assert_eq!(ActorId(42).mention(), "<@42>");
        assert_eq!(RoleId(7).mention(), "<@&7>");
        assert_eq!(Member::new(9, "nine").mention(), "<@9>");
    }

    #[test]
    fn test_member_roles() {
        let member = Member::new(1, "alice").with_role("Head Middleman");
        assert!(member.holds_role("Head Middleman"));
        assert!(!member.holds_role("head middleman"));
        assert!(!member.administrator);
    }

    #[test]
    fn test_access_levels() {
        assert!(Access::ReadWrite.can_write());
        assert!(Access::Manage.can_write());
        assert!(Access::ReadOnly.can_read());
        assert!(!Access::ReadOnly.can_write());
        assert!(!Access::Denied.can_read());
    }

    #[test]
    fn test_snowflake_serializes_transparently() {
        let json = serde_json::to_string(&ChannelId(123)).unwrap();
        assert_eq!(json, "123");

        let target = OverwriteTarget::Member(ActorId(5));
        let json = serde_json::to_string(&target).unwrap();
        assert_eq!(json, r#"{"type":"member","id":5}"#);
    }
}

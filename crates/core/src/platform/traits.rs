//! The chat-platform collaborator.

use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

use super::types::{
    ActorId, CategoryId, ChannelId, ChannelInfo, HistoryMessage, Member, OutgoingMessage,
    PermissionOverwrite, RoleId,
};

/// Failures reported by the platform.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlatformError {
    #[error("missing permission: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("{0}")]
    Other(String),
}

/// Lazily yielded channel history, oldest first.
pub type MessageStream = BoxStream<'static, Result<HistoryMessage, PlatformError>>;

/// Operations the ticket core consumes from the guild it runs in.
///
/// Implementations wrap a live gateway/REST connection scoped to one guild.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// The bot's own identity.
    fn system_actor(&self) -> ActorId;

    /// Look a member up, reading roles live.
    async fn member(&self, id: ActorId) -> Result<Option<Member>, PlatformError>;

    /// Every member of the guild.
    async fn members(&self) -> Result<Vec<Member>, PlatformError>;

    async fn find_role(&self, name: &str) -> Result<Option<RoleId>, PlatformError>;

    async fn create_role(&self, name: &str) -> Result<RoleId, PlatformError>;

    async fn find_category(&self, name: &str) -> Result<Option<CategoryId>, PlatformError>;

    async fn create_category(
        &self,
        name: &str,
        overwrites: Vec<PermissionOverwrite>,
    ) -> Result<CategoryId, PlatformError>;

    async fn find_text_channel(&self, name: &str) -> Result<Option<ChannelId>, PlatformError>;

    async fn channel(&self, id: ChannelId) -> Result<Option<ChannelInfo>, PlatformError>;

    async fn create_text_channel(
        &self,
        category: CategoryId,
        name: &str,
        overwrites: Vec<PermissionOverwrite>,
    ) -> Result<ChannelId, PlatformError>;

    async fn edit_permissions(
        &self,
        channel: ChannelId,
        overwrite: PermissionOverwrite,
    ) -> Result<(), PlatformError>;

    async fn rename_channel(&self, channel: ChannelId, name: &str) -> Result<(), PlatformError>;

    async fn delete_channel(&self, channel: ChannelId) -> Result<(), PlatformError>;

    async fn post_message(
        &self,
        channel: ChannelId,
        message: OutgoingMessage,
    ) -> Result<(), PlatformError>;

    /// Full history of a channel, oldest first, without a page limit.
    async fn read_history(&self, channel: ChannelId) -> Result<MessageStream, PlatformError>;
}

//! Mock chat platform for testing.

use async_trait::async_trait;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::platform::{
    Access, ActorId, CategoryId, ChannelId, ChannelInfo, ChatPlatform, HistoryMessage, Member,
    MessageStream, OutgoingMessage, OverwriteTarget, PermissionOverwrite, PlatformError, RoleId,
};

/// Display name the mock gives the system actor.
pub const BOT_NAME: &str = "Middleman Bot";

/// Platform operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOperation {
    CreateRole,
    CreateCategory,
    CreateTextChannel,
    EditPermissions,
    RenameChannel,
    DeleteChannel,
    PostMessage,
    ReadHistory,
}

/// A message posted through the platform, for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedPost {
    pub channel: ChannelId,
    pub message: OutgoingMessage,
}

#[derive(Debug, Clone)]
struct MockCategory {
    name: String,
    overwrites: Vec<PermissionOverwrite>,
}

#[derive(Debug, Clone)]
struct MockChannel {
    name: String,
    category: Option<CategoryId>,
    overwrites: Vec<PermissionOverwrite>,
    history: Vec<HistoryMessage>,
    /// Yield this many messages, then fail the read.
    history_breaks_after: Option<usize>,
}

#[derive(Debug)]
struct Guild {
    next_id: u64,
    members: BTreeMap<ActorId, Member>,
    roles: BTreeMap<RoleId, String>,
    categories: BTreeMap<CategoryId, MockCategory>,
    channels: BTreeMap<ChannelId, MockChannel>,
    posts: Vec<RecordedPost>,
    deleted: Vec<ChannelId>,
    failures: HashMap<MockOperation, PlatformError>,
}

impl Guild {
    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn take_failure(&mut self, op: MockOperation) -> Result<(), PlatformError> {
        match self.failures.remove(&op) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn channel_mut(&mut self, id: ChannelId) -> Result<&mut MockChannel, PlatformError> {
        self.channels
            .get_mut(&id)
            .ok_or_else(|| PlatformError::NotFound(format!("channel {}", id)))
    }
}

fn upsert_overwrite(overwrites: &mut Vec<PermissionOverwrite>, overwrite: PermissionOverwrite) {
    match overwrites.iter_mut().find(|o| o.target == overwrite.target) {
        Some(existing) => existing.access = overwrite.access,
        None => overwrites.push(overwrite),
    }
}

fn rank(access: Access) -> u8 {
    match access {
        Access::Denied => 0,
        Access::ReadOnly => 1,
        Access::ReadWrite => 2,
        Access::Manage => 3,
    }
}

/// Mock implementation of the ChatPlatform trait: one in-memory guild.
///
/// Provides controllable behavior for testing:
/// - Members, roles, categories and channels with permission overwrites
/// - Message history per channel
/// - Recorded posts and deletions for assertions
/// - One-shot failure injection per operation
///
/// # Example
///
/// ```rust,ignore
/// use middleman_core::testing::{MockOperation, MockPlatform};
///
/// let platform = MockPlatform::new();
/// platform.add_member(Member::new(100u64, "alice")).await;
/// let category = platform.add_category("TICKETS").await;
///
/// platform.fail_next(MockOperation::DeleteChannel, PlatformError::Forbidden("x".into())).await;
/// ```
#[derive(Debug, Clone)]
pub struct MockPlatform {
    system_actor: ActorId,
    guild: Arc<RwLock<Guild>>,
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPlatform {
    /// Create a guild containing only the system actor.
    pub fn new() -> Self {
        let system_actor = ActorId(1);
        let mut members = BTreeMap::new();
        members.insert(system_actor, Member::new(system_actor, BOT_NAME));
        Self {
            system_actor,
            guild: Arc::new(RwLock::new(Guild {
                next_id: 1000,
                members,
                roles: BTreeMap::new(),
                categories: BTreeMap::new(),
                channels: BTreeMap::new(),
                posts: Vec::new(),
                deleted: Vec::new(),
                failures: HashMap::new(),
            })),
        }
    }

    // -------------------------------------------------------------------------
    // Guild setup
    // -------------------------------------------------------------------------

    pub async fn add_member(&self, member: Member) {
        self.guild.write().await.members.insert(member.id, member);
    }

    pub async fn remove_member(&self, id: ActorId) {
        self.guild.write().await.members.remove(&id);
    }

    /// Replace a member's role names.
    pub async fn set_member_roles(&self, id: ActorId, roles: &[&str]) {
        if let Some(member) = self.guild.write().await.members.get_mut(&id) {
            member.roles = roles.iter().map(|r| r.to_string()).collect();
        }
    }

    pub async fn add_role(&self, name: &str) -> RoleId {
        let mut guild = self.guild.write().await;
        let id = RoleId(guild.allocate());
        guild.roles.insert(id, name.to_string());
        id
    }

    pub async fn add_category(&self, name: &str) -> CategoryId {
        let mut guild = self.guild.write().await;
        let id = CategoryId(guild.allocate());
        guild.categories.insert(
            id,
            MockCategory {
                name: name.to_string(),
                overwrites: Vec::new(),
            },
        );
        id
    }

    pub async fn remove_category(&self, id: CategoryId) {
        self.guild.write().await.categories.remove(&id);
    }

    pub async fn add_channel(&self, category: Option<CategoryId>, name: &str) -> ChannelId {
        let mut guild = self.guild.write().await;
        let id = ChannelId(guild.allocate());
        guild.channels.insert(
            id,
            MockChannel {
                name: name.to_string(),
                category,
                overwrites: Vec::new(),
                history: Vec::new(),
                history_breaks_after: None,
            },
        );
        id
    }

    /// Append a message to a channel's history.
    pub async fn push_history(&self, channel: ChannelId, message: HistoryMessage) {
        if let Some(ch) = self.guild.write().await.channels.get_mut(&channel) {
            ch.history.push(message);
        }
    }

    /// Make history reads of a channel fail after yielding `count` messages.
    pub async fn break_history_after(&self, channel: ChannelId, count: usize) {
        if let Some(ch) = self.guild.write().await.channels.get_mut(&channel) {
            ch.history_breaks_after = Some(count);
        }
    }

    /// Configure the next call of `op` to fail with `error`.
    pub async fn fail_next(&self, op: MockOperation, error: PlatformError) {
        self.guild.write().await.failures.insert(op, error);
    }

    // -------------------------------------------------------------------------
    // Assertions
    // -------------------------------------------------------------------------

    /// Every post, in order.
    pub async fn posts(&self) -> Vec<RecordedPost> {
        self.guild.read().await.posts.clone()
    }

    pub async fn posts_in(&self, channel: ChannelId) -> Vec<OutgoingMessage> {
        self.guild
            .read()
            .await
            .posts
            .iter()
            .filter(|p| p.channel == channel)
            .map(|p| p.message.clone())
            .collect()
    }

    pub async fn channel_exists(&self, id: ChannelId) -> bool {
        self.guild.read().await.channels.contains_key(&id)
    }

    pub async fn channel_name(&self, id: ChannelId) -> Option<String> {
        self.guild
            .read()
            .await
            .channels
            .get(&id)
            .map(|c| c.name.clone())
    }

    /// Channels inside a category, by name.
    pub async fn channels_in(&self, category: CategoryId) -> Vec<(ChannelId, String)> {
        self.guild
            .read()
            .await
            .channels
            .iter()
            .filter(|(_, c)| c.category == Some(category))
            .map(|(id, c)| (*id, c.name.clone()))
            .collect()
    }

    pub async fn deleted_channels(&self) -> Vec<ChannelId> {
        self.guild.read().await.deleted.clone()
    }

    pub async fn role_names(&self) -> Vec<String> {
        self.guild.read().await.roles.values().cloned().collect()
    }

    pub async fn overwrites(&self, channel: ChannelId) -> Vec<PermissionOverwrite> {
        self.guild
            .read()
            .await
            .channels
            .get(&channel)
            .map(|c| c.overwrites.clone())
            .unwrap_or_default()
    }

    pub async fn category_overwrites(&self, category: CategoryId) -> Vec<PermissionOverwrite> {
        self.guild
            .read()
            .await
            .categories
            .get(&category)
            .map(|c| c.overwrites.clone())
            .unwrap_or_default()
    }

    /// The explicit overwrite for one target, if any.
    pub async fn overwrite_for(
        &self,
        channel: ChannelId,
        target: OverwriteTarget,
    ) -> Option<Access> {
        self.overwrites(channel)
            .await
            .into_iter()
            .find(|o| o.target == target)
            .map(|o| o.access)
    }

    /// What the actor can effectively do in a channel.
    ///
    /// Administrators manage everything; a member overwrite beats role
    /// overwrites, which beat the everyone overwrite.
    pub async fn effective_access(&self, channel: ChannelId, actor: ActorId) -> Access {
        let guild = self.guild.read().await;
        let Some(member) = guild.members.get(&actor) else {
            return Access::Denied;
        };
        if member.administrator {
            return Access::Manage;
        }
        let Some(ch) = guild.channels.get(&channel) else {
            return Access::Denied;
        };

        if let Some(o) = ch
            .overwrites
            .iter()
            .find(|o| o.target == OverwriteTarget::Member(actor))
        {
            return o.access;
        }

        let role_access = ch
            .overwrites
            .iter()
            .filter_map(|o| match o.target {
                OverwriteTarget::Role(role) => guild
                    .roles
                    .get(&role)
                    .filter(|name| member.holds_role(name))
                    .map(|_| o.access),
                _ => None,
            })
            .max_by_key(|a| rank(*a));
        if let Some(access) = role_access {
            return access;
        }

        ch.overwrites
            .iter()
            .find(|o| o.target == OverwriteTarget::Everyone)
            .map(|o| o.access)
            .unwrap_or(Access::ReadWrite)
    }
}

#[async_trait]
impl ChatPlatform for MockPlatform {
    fn system_actor(&self) -> ActorId {
        self.system_actor
    }

    async fn member(&self, id: ActorId) -> Result<Option<Member>, PlatformError> {
        Ok(self.guild.read().await.members.get(&id).cloned())
    }

    async fn members(&self) -> Result<Vec<Member>, PlatformError> {
        Ok(self.guild.read().await.members.values().cloned().collect())
    }

    async fn find_role(&self, name: &str) -> Result<Option<RoleId>, PlatformError> {
        Ok(self
            .guild
            .read()
            .await
            .roles
            .iter()
            .find(|(_, n)| n.as_str() == name)
            .map(|(id, _)| *id))
    }

    async fn create_role(&self, name: &str) -> Result<RoleId, PlatformError> {
        let mut guild = self.guild.write().await;
        guild.take_failure(MockOperation::CreateRole)?;
        let id = RoleId(guild.allocate());
        guild.roles.insert(id, name.to_string());
        Ok(id)
    }

    async fn find_category(&self, name: &str) -> Result<Option<CategoryId>, PlatformError> {
        Ok(self
            .guild
            .read()
            .await
            .categories
            .iter()
            .find(|(_, c)| c.name == name)
            .map(|(id, _)| *id))
    }

    async fn create_category(
        &self,
        name: &str,
        overwrites: Vec<PermissionOverwrite>,
    ) -> Result<CategoryId, PlatformError> {
        let mut guild = self.guild.write().await;
        guild.take_failure(MockOperation::CreateCategory)?;
        let id = CategoryId(guild.allocate());
        guild.categories.insert(
            id,
            MockCategory {
                name: name.to_string(),
                overwrites,
            },
        );
        Ok(id)
    }

    async fn find_text_channel(&self, name: &str) -> Result<Option<ChannelId>, PlatformError> {
        Ok(self
            .guild
            .read()
            .await
            .channels
            .iter()
            .find(|(_, c)| c.name == name)
            .map(|(id, _)| *id))
    }

    async fn channel(&self, id: ChannelId) -> Result<Option<ChannelInfo>, PlatformError> {
        Ok(self
            .guild
            .read()
            .await
            .channels
            .get(&id)
            .map(|c| ChannelInfo {
                id,
                name: c.name.clone(),
                category: c.category,
            }))
    }

    async fn create_text_channel(
        &self,
        category: CategoryId,
        name: &str,
        overwrites: Vec<PermissionOverwrite>,
    ) -> Result<ChannelId, PlatformError> {
        let mut guild = self.guild.write().await;
        guild.take_failure(MockOperation::CreateTextChannel)?;
        if !guild.categories.contains_key(&category) {
            return Err(PlatformError::NotFound(format!("category {}", category)));
        }
        let id = ChannelId(guild.allocate());
        guild.channels.insert(
            id,
            MockChannel {
                name: name.to_string(),
                category: Some(category),
                overwrites,
                history: Vec::new(),
                history_breaks_after: None,
            },
        );
        Ok(id)
    }

    async fn edit_permissions(
        &self,
        channel: ChannelId,
        overwrite: PermissionOverwrite,
    ) -> Result<(), PlatformError> {
        let mut guild = self.guild.write().await;
        guild.take_failure(MockOperation::EditPermissions)?;
        let ch = guild.channel_mut(channel)?;
        upsert_overwrite(&mut ch.overwrites, overwrite);
        Ok(())
    }

    async fn rename_channel(&self, channel: ChannelId, name: &str) -> Result<(), PlatformError> {
        let mut guild = self.guild.write().await;
        guild.take_failure(MockOperation::RenameChannel)?;
        guild.channel_mut(channel)?.name = name.to_string();
        Ok(())
    }

    async fn delete_channel(&self, channel: ChannelId) -> Result<(), PlatformError> {
        let mut guild = self.guild.write().await;
        guild.take_failure(MockOperation::DeleteChannel)?;
        if guild.channels.remove(&channel).is_none() {
            return Err(PlatformError::NotFound(format!("channel {}", channel)));
        }
        guild.deleted.push(channel);
        Ok(())
    }

    async fn post_message(
        &self,
        channel: ChannelId,
        message: OutgoingMessage,
    ) -> Result<(), PlatformError> {
        let mut guild = self.guild.write().await;
        guild.take_failure(MockOperation::PostMessage)?;

        let content = message
            .content
            .clone()
            .or_else(|| message.embed.as_ref().map(|e| e.title.clone()))
            .unwrap_or_default();
        let ch = guild.channel_mut(channel)?;
        ch.history.push(HistoryMessage {
            timestamp: Utc::now(),
            author_display_name: BOT_NAME.to_string(),
            content,
            attachments: Vec::new(),
        });
        guild.posts.push(RecordedPost { channel, message });
        Ok(())
    }

    async fn read_history(&self, channel: ChannelId) -> Result<MessageStream, PlatformError> {
        let mut guild = self.guild.write().await;
        guild.take_failure(MockOperation::ReadHistory)?;
        let ch = guild.channel_mut(channel)?;

        let history = ch.history.clone();
        let Some(limit) = ch.history_breaks_after else {
            return Ok(stream::iter(history.into_iter().map(Ok)).boxed());
        };

        let items: Vec<Result<HistoryMessage, PlatformError>> = history
            .into_iter()
            .take(limit)
            .map(Ok)
            .chain(std::iter::once(Err(PlatformError::Http {
                status: 503,
                message: "history read interrupted".to_string(),
            })))
            .collect();
        Ok(stream::iter(items).boxed())
    }
}

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info, warn};

use super::naming::normalize_channel_name;
use super::types::{DeleteOutcome, Transition, TranscriptTrigger};
use crate::auth::{create_policy, StaffPolicy};
use crate::config::TicketsConfig;
use crate::metrics;
use crate::platform::{
    Access, ActorId, ChannelId, ChannelInfo, ChatPlatform, ControlSet, Embed, EmbedColor, Member,
    OutgoingMessage, OverwriteTarget, PermissionOverwrite, PlatformError, RoleId,
};
use crate::state::StateStore;
use crate::ticket::{
    channel_name_for, RequestForm, ServiceRequest, Ticket, TicketError, TicketState, TicketType,
};
use crate::transcript::{PublishedTranscript, TranscriptError, TranscriptGenerator, TranscriptPublisher};

/// Owns ticket creation, access changes, transcripts and teardown.
///
/// All process-wide state lives in the injected [`StateStore`]; mutations on
/// one ticket are serialized through its per-ticket lock.
pub struct LifecycleController {
    pub(super) platform: Arc<dyn ChatPlatform>,
    publisher: Arc<dyn TranscriptPublisher>,
    pub(super) state: Arc<StateStore>,
    pub(super) policy: StaffPolicy,
    generator: TranscriptGenerator,
    pub(super) config: TicketsConfig,
}

impl LifecycleController {
    pub fn new(
        platform: Arc<dyn ChatPlatform>,
        publisher: Arc<dyn TranscriptPublisher>,
        state: Arc<StateStore>,
        config: TicketsConfig,
    ) -> Self {
        Self {
            generator: TranscriptGenerator::new(Arc::clone(&platform)),
            policy: create_policy(&config),
            platform,
            publisher,
            state,
            config,
        }
    }

    pub fn policy(&self) -> &StaffPolicy {
        &self.policy
    }

    pub fn state(&self) -> &StateStore {
        &self.state
    }

    pub fn category_name(&self) -> &str {
        &self.config.category_name
    }

    pub fn system_actor(&self) -> ActorId {
        self.platform.system_actor()
    }

    // =========================================================================
    // Classification and authorization
    // =========================================================================

    /// Whether a channel sits inside the ticket category.
    ///
    /// The category id is cached for the process lifetime. A channel whose
    /// category does not match the cached id triggers a fresh lookup by
    /// name, so a recreated category is picked up.
    pub async fn is_ticket_channel(&self, channel: &ChannelInfo) -> Result<bool, PlatformError> {
        let Some(category) = channel.category else {
            return Ok(false);
        };
        if self.state.cached_category() == Some(category) {
            return Ok(true);
        }

        match self.platform.find_category(&self.config.category_name).await? {
            Some(current) => {
                if self.state.cached_category() != Some(current) {
                    debug!(category_id = %current, "Cached ticket category");
                }
                self.state.cache_category(current);
                Ok(current == category)
            }
            None => {
                self.state.invalidate_category();
                Ok(false)
            }
        }
    }

    /// Resolve a channel that must be a ticket.
    pub(super) async fn ticket_channel(&self, id: ChannelId) -> Result<ChannelInfo, TicketError> {
        let channel = self
            .platform
            .channel(id)
            .await?
            .ok_or(TicketError::NotATicket)?;
        if self.is_ticket_channel(&channel).await? {
            Ok(channel)
        } else {
            Err(TicketError::NotATicket)
        }
    }

    /// Look the actor up live and apply `allowed` to it.
    pub(super) async fn authorize(
        &self,
        actor: ActorId,
        channel: Option<ChannelId>,
        action: &'static str,
        allowed: impl Fn(&StaffPolicy, &Member) -> bool,
    ) -> Result<Member, TicketError> {
        match self.platform.member(actor).await? {
            Some(member) if allowed(&self.policy, &member) => Ok(member),
            _ => {
                warn!(
                    actor_id = %actor,
                    channel_id = channel.map(|c| c.0),
                    action,
                    "Permission denied"
                );
                metrics::PERMISSION_DENIALS.inc();
                metrics::LIFECYCLE_ACTIONS
                    .with_label_values(&[action, "denied"])
                    .inc();
                Err(TicketError::PermissionDenied)
            }
        }
    }

    /// Take the ticket lock, then check the channel outlived the wait.
    async fn lock_live(&self, channel: ChannelId) -> Result<OwnedMutexGuard<()>, TicketError> {
        let guard = self.state.locks().acquire(channel).await;
        if self.platform.channel(channel).await?.is_none() {
            return Err(TicketError::NotATicket);
        }
        Ok(guard)
    }

    /// Ids of the staff roles that currently exist.
    pub(super) async fn staff_role_ids(&self) -> Result<Vec<RoleId>, PlatformError> {
        let mut ids = Vec::new();
        for name in self.policy.staff_roles() {
            if let Some(id) = self.platform.find_role(name).await? {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    fn record(action: &str, result: &str) {
        metrics::LIFECYCLE_ACTIONS
            .with_label_values(&[action, result])
            .inc();
    }

    /// Post something that is informative but not essential to the operation.
    pub(super) async fn post_best_effort(&self, channel: ChannelId, message: OutgoingMessage) {
        if let Err(e) = self.platform.post_message(channel, message).await {
            warn!(channel_id = %channel, error = %e, "Failed to post message");
        }
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// The form shown after a tier is picked from the panel.
    pub fn request_form(&self, ticket_type: &str) -> Result<RequestForm, TicketError> {
        let ticket_type: TicketType = ticket_type
            .parse()
            .map_err(|_| TicketError::InvalidSelection(ticket_type.to_string()))?;
        Ok(RequestForm::for_type(ticket_type))
    }

    /// Post the service-selection panel. Administrators only.
    pub async fn post_panel(&self, channel: ChannelId, actor: ActorId) -> Result<(), TicketError> {
        self.authorize(actor, Some(channel), "panel", |_, m| m.administrator)
            .await?;

        let tiers: Vec<String> = TicketType::ALL
            .iter()
            .map(|t| format!("• {}", t.panel_label()))
            .collect();
        let embed = Embed::new("Middleman Services", EmbedColor::Blue).with_description(format!(
            "Select the type of middleman service you need:\n\n{}",
            tiers.join("\n")
        ));

        self.platform
            .post_message(
                channel,
                OutgoingMessage::embed(embed).with_controls(ControlSet::ServicePanel),
            )
            .await?;
        info!(channel_id = %channel, actor_id = %actor, "Service panel posted");
        Ok(())
    }

    /// Validate a service request and provision its ticket channel.
    ///
    /// The sequence counter is held from name assignment until the channel
    /// exists and only advances on success.
    pub async fn create_ticket(
        &self,
        request: ServiceRequest,
        requester: ActorId,
    ) -> Result<Ticket, TicketError> {
        let result = self.create_ticket_inner(request, requester).await;
        if let Err(e) = &result {
            let reason = match e {
                TicketError::Configuration(_) => "configuration",
                TicketError::InvalidSelection(_) => "invalid_selection",
                TicketError::TipRequired(_) => "tip_required",
                TicketError::UnresolvedCounterparty { .. } => "unresolved_counterparty",
                _ => "platform",
            };
            info!(actor_id = %requester, reason, error = %e, "Ticket request rejected");
            metrics::TICKET_CREATIONS_REJECTED
                .with_label_values(&[reason])
                .inc();
        }
        result
    }

    async fn create_ticket_inner(
        &self,
        request: ServiceRequest,
        requester: ActorId,
    ) -> Result<Ticket, TicketError> {
        let category = self
            .platform
            .find_category(&self.config.category_name)
            .await?
            .ok_or_else(|| {
                TicketError::Configuration(format!(
                    "Category '{}' does not exist; run setup first.",
                    self.config.category_name
                ))
            })?;
        self.state.cache_category(category);

        let ticket_type: TicketType = request
            .ticket_type
            .parse()
            .map_err(|_| TicketError::InvalidSelection(request.ticket_type.clone()))?;

        if ticket_type.tip_required() && request.tip().is_none() {
            return Err(TicketError::TipRequired(ticket_type));
        }

        let counterparty_id = request
            .parsed_counterparty()
            .ok_or_else(|| TicketError::non_numeric_counterparty(&request.counterparty_id))?;
        let counterparty = self
            .platform
            .member(counterparty_id)
            .await?
            .ok_or_else(|| TicketError::counterparty_not_in_guild(&request.counterparty_id))?;
        let requester = self
            .platform
            .member(requester)
            .await?
            .ok_or(TicketError::UnknownMember(requester))?;

        let staff_roles = self.staff_role_ids().await?;
        let mut overwrites = vec![
            PermissionOverwrite::denied(OverwriteTarget::Everyone),
            PermissionOverwrite::read_write(OverwriteTarget::Member(requester.id)),
            PermissionOverwrite::read_write(OverwriteTarget::Member(counterparty.id)),
            PermissionOverwrite::new(
                OverwriteTarget::Member(self.platform.system_actor()),
                Access::Manage,
            ),
        ];
        overwrites.extend(
            staff_roles
                .iter()
                .map(|role| PermissionOverwrite::read_write(OverwriteTarget::Role(*role))),
        );

        let (channel_id, name, sequence) = {
            let mut next = self.state.lock_sequence().await;
            let sequence = *next;
            let name = channel_name_for(ticket_type, sequence);
            let channel_id = self
                .platform
                .create_text_channel(category, &name, overwrites)
                .await?;
            *next += 1;
            (channel_id, name, sequence)
        };

        let now = Utc::now();
        let ticket = Ticket {
            channel_id,
            name,
            ticket_type,
            sequence,
            state: TicketState::Open,
            requester: requester.id,
            counterparty: counterparty.id,
            created_at: now,
            updated_at: now,
        };
        self.state.tickets().insert(ticket.clone())?;
        self.state
            .membership()
            .insert(channel_id, [requester.id, counterparty.id]);

        let pings: Vec<String> = staff_roles.iter().map(RoleId::mention).collect();
        let mut summary = Embed::new("New Middleman Request", EmbedColor::Green)
            .with_field(
                format!("{}'s side", requester.display_name),
                &request.requester_offer,
            )
            .with_field(
                format!("{}'s side", counterparty.display_name),
                &request.counterparty_offer,
            )
            .with_field(
                "Their User",
                format!("{} (ID: {})", counterparty.mention(), counterparty.id),
            );
        if let Some(tip) = request.tip() {
            summary = summary.with_field("Tip", tip);
        }
        summary = summary.with_footer(format!("Ticket created by {}", requester.display_name));

        self.post_best_effort(
            channel_id,
            OutgoingMessage::text(format!(
                "{} has requested a middleman service with {}!\n{}",
                requester.mention(),
                counterparty.mention(),
                pings.join(" ")
            ))
            .with_embed(summary),
        )
        .await;
        self.post_best_effort(channel_id, OutgoingMessage::controls(ControlSet::Lifecycle))
            .await;

        info!(
            channel_id = %channel_id,
            actor_id = %requester.id,
            ticket_type = %ticket_type,
            sequence,
            "Ticket created"
        );
        metrics::TICKETS_CREATED
            .with_label_values(&[ticket_type.as_str()])
            .inc();
        Self::record("create", "ok");
        Ok(ticket)
    }

    // =========================================================================
    // Membership and naming
    // =========================================================================

    /// Rename a ticket channel. Staff and support roles only.
    ///
    /// Returns the normalized name that was applied.
    pub async fn rename(
        &self,
        channel: ChannelId,
        actor: ActorId,
        requested: &str,
    ) -> Result<String, TicketError> {
        self.ticket_channel(channel).await?;
        self.authorize(actor, Some(channel), "rename", StaffPolicy::may_rename)
            .await?;

        let name = normalize_channel_name(requested);
        if name.is_empty() {
            return Err(TicketError::InvalidName(requested.to_string()));
        }

        let _guard = self.lock_live(channel).await?;
        self.platform.rename_channel(channel, &name).await?;
        if self.state.tickets().get(channel).is_some() {
            self.state.tickets().rename(channel, &name)?;
        }

        info!(channel_id = %channel, actor_id = %actor, name = %name, "Ticket renamed");
        Self::record("rename", "ok");
        Ok(name)
    }

    /// Grant a member access. Returns `false` if they were already attached.
    pub async fn add_member(
        &self,
        channel: ChannelId,
        actor: ActorId,
        target: ActorId,
    ) -> Result<bool, TicketError> {
        self.ticket_channel(channel).await?;
        self.authorize(actor, Some(channel), "add", StaffPolicy::has_permission)
            .await?;
        let target = self
            .platform
            .member(target)
            .await?
            .ok_or(TicketError::UnknownMember(target))?;

        let _guard = self.lock_live(channel).await?;
        self.platform
            .edit_permissions(
                channel,
                PermissionOverwrite::read_write(OverwriteTarget::Member(target.id)),
            )
            .await?;
        let added = self.state.membership().add(channel, target.id);

        info!(channel_id = %channel, actor_id = %actor, target = %target.id, added, "Member added");
        Self::record("add", if added { "ok" } else { "unchanged" });
        Ok(added)
    }

    /// Revoke a member's access. Returns `false` if they were not attached.
    pub async fn remove_member(
        &self,
        channel: ChannelId,
        actor: ActorId,
        target: ActorId,
    ) -> Result<bool, TicketError> {
        self.ticket_channel(channel).await?;
        self.authorize(actor, Some(channel), "remove", StaffPolicy::has_permission)
            .await?;
        let target = self
            .platform
            .member(target)
            .await?
            .ok_or(TicketError::UnknownMember(target))?;

        let _guard = self.lock_live(channel).await?;
        self.platform
            .edit_permissions(
                channel,
                PermissionOverwrite::denied(OverwriteTarget::Member(target.id)),
            )
            .await?;
        let removed = self.state.membership().remove(channel, target.id);

        info!(channel_id = %channel, actor_id = %actor, target = %target.id, removed, "Member removed");
        Self::record("remove", if removed { "ok" } else { "unchanged" });
        Ok(removed)
    }

    // =========================================================================
    // Open / close
    // =========================================================================

    fn tracked_state(&self, channel: ChannelId) -> Option<TicketState> {
        self.state.tickets().get(channel).map(|t| t.state)
    }

    /// Reopen a closed ticket.
    ///
    /// Restores access for every explicit member and every staff role. An
    /// already open ticket is left alone.
    pub async fn reopen(&self, channel: ChannelId, actor: ActorId) -> Result<Transition, TicketError> {
        self.ticket_channel(channel).await?;
        self.authorize(actor, Some(channel), "open", StaffPolicy::has_permission)
            .await?;

        let _guard = self.lock_live(channel).await?;
        if self.tracked_state(channel) == Some(TicketState::Open) {
            debug!(channel_id = %channel, "Reopen on an open ticket");
            Self::record("open", "unchanged");
            return Ok(Transition::Unchanged);
        }

        for member_id in self.state.membership().members(channel) {
            if self.platform.member(member_id).await?.is_some() {
                self.platform
                    .edit_permissions(
                        channel,
                        PermissionOverwrite::read_write(OverwriteTarget::Member(member_id)),
                    )
                    .await?;
            }
        }
        for role in self.staff_role_ids().await? {
            self.platform
                .edit_permissions(
                    channel,
                    PermissionOverwrite::read_write(OverwriteTarget::Role(role)),
                )
                .await?;
        }

        self.platform
            .post_message(
                channel,
                OutgoingMessage::text(format!("Ticket reopened by {}", actor.mention()))
                    .with_controls(ControlSet::Lifecycle),
            )
            .await?;

        if self.tracked_state(channel).is_some() {
            self.state.tickets().update_state(channel, TicketState::Open)?;
        }
        info!(channel_id = %channel, actor_id = %actor, "Ticket reopened");
        Self::record("open", "ok");
        Ok(Transition::Applied)
    }

    /// Close a ticket.
    ///
    /// Posts the closed notice, then revokes access from every guild member
    /// without permission. Staff and the system actor keep access.
    pub async fn close(&self, channel: ChannelId, actor: ActorId) -> Result<Transition, TicketError> {
        self.ticket_channel(channel).await?;
        self.authorize(actor, Some(channel), "close", StaffPolicy::has_permission)
            .await?;

        let _guard = self.lock_live(channel).await?;
        if self.tracked_state(channel) == Some(TicketState::Closed) {
            debug!(channel_id = %channel, "Close on a closed ticket");
            Self::record("close", "unchanged");
            return Ok(Transition::Unchanged);
        }

        let notice = Embed::new("Ticket Closed", EmbedColor::Red)
            .with_description(format!("Closed by {}", actor.mention()));
        self.platform
            .post_message(
                channel,
                OutgoingMessage::embed(notice).with_controls(ControlSet::Closed),
            )
            .await?;

        let system = self.platform.system_actor();
        let mut revoked = 0usize;
        for member in self.platform.members().await? {
            if member.id == system || self.policy.has_permission(&member) {
                continue;
            }
            self.platform
                .edit_permissions(
                    channel,
                    PermissionOverwrite::denied(OverwriteTarget::Member(member.id)),
                )
                .await?;
            revoked += 1;
        }

        if self.tracked_state(channel).is_some() {
            self.state
                .tickets()
                .update_state(channel, TicketState::Closed)?;
        }
        info!(channel_id = %channel, actor_id = %actor, revoked, "Ticket closed");
        Self::record("close", "ok");
        Ok(Transition::Applied)
    }

    // =========================================================================
    // Transcripts and deletion
    // =========================================================================

    /// Generate and publish a transcript, then announce it in the
    /// transcripts channel when that exists.
    async fn produce_transcript(
        &self,
        channel: &ChannelInfo,
    ) -> Result<PublishedTranscript, TranscriptError> {
        let result = async {
            let record = self.generator.generate(channel, Utc::now()).await?;
            metrics::TRANSCRIPT_MESSAGES.observe(record.entries().len() as f64);
            self.publisher.publish(&record).await
        }
        .await;

        match &result {
            Ok(published) => {
                metrics::TRANSCRIPTS.with_label_values(&["published"]).inc();
                info!(channel_id = %channel.id, url = %published.url, "Transcript published");
                match self
                    .platform
                    .find_text_channel(&self.config.transcripts_channel_name)
                    .await
                {
                    Ok(Some(archive)) if archive != channel.id => {
                        self.post_best_effort(
                            archive,
                            OutgoingMessage::text(format!(
                                "Transcript for #{}: {}",
                                channel.name, published.url
                            )),
                        )
                        .await;
                    }
                    Ok(_) => {}
                    Err(e) => warn!(error = %e, "Could not look up transcripts channel"),
                }
            }
            Err(e) => {
                metrics::TRANSCRIPTS
                    .with_label_values(&[e.result_label()])
                    .inc();
                warn!(channel_id = %channel.id, error = %e, "Transcript generation failed");
            }
        }
        result
    }

    /// Generate a transcript without changing the ticket.
    pub async fn transcript(
        &self,
        channel: ChannelId,
        actor: ActorId,
        trigger: TranscriptTrigger,
    ) -> Result<PublishedTranscript, TicketError> {
        let info = self.ticket_channel(channel).await?;
        match trigger {
            TranscriptTrigger::Control => {
                self.authorize(actor, Some(channel), "transcript", StaffPolicy::has_permission)
                    .await?
            }
            TranscriptTrigger::Command => {
                self.authorize(
                    actor,
                    Some(channel),
                    "transcript",
                    StaffPolicy::may_generate_transcript,
                )
                .await?
            }
        };

        let _guard = self.lock_live(channel).await?;
        let published = self.produce_transcript(&info).await?;
        Self::record("transcript", "ok");
        Ok(published)
    }

    /// Transcript, grace delay, then teardown.
    ///
    /// A failed transcript never blocks deletion. The ticket lock is held
    /// through the grace delay, so nothing else runs on this ticket
    /// meanwhile; other tickets are unaffected.
    pub async fn delete(&self, channel: ChannelId, actor: ActorId) -> Result<DeleteOutcome, TicketError> {
        let info = self.ticket_channel(channel).await?;
        self.authorize(actor, Some(channel), "delete", StaffPolicy::has_permission)
            .await?;

        let _guard = self.lock_live(channel).await?;

        self.post_best_effort(
            channel,
            OutgoingMessage::text("Generating transcript before deletion..."),
        )
        .await;

        let transcript = self.produce_transcript(&info).await;
        match &transcript {
            Ok(published) => {
                self.post_best_effort(
                    channel,
                    OutgoingMessage::text(format!("Transcript saved: {}", published.url)),
                )
                .await;
            }
            Err(e) => {
                self.post_best_effort(
                    channel,
                    OutgoingMessage::text(format!(
                        "Failed to generate transcript: {}. Deleting anyway.",
                        e
                    )),
                )
                .await;
            }
        }

        tokio::time::sleep(self.config.delete_grace()).await;

        match self.platform.delete_channel(channel).await {
            Ok(()) | Err(PlatformError::NotFound(_)) => {}
            Err(e) => {
                Self::record("delete", "error");
                return Err(e.into());
            }
        }
        if let Some(ticket) = self.state.tickets().remove(channel) {
            debug!(channel_id = %channel, sequence = ticket.sequence, "Ticket struck from store");
        }
        self.state.membership().erase(channel);
        self.state.locks().forget(channel);

        info!(
            channel_id = %channel,
            actor_id = %actor,
            transcript = transcript.is_ok(),
            "Ticket deleted"
        );
        Self::record("delete", "ok");
        Ok(DeleteOutcome {
            channel_id: channel,
            channel_name: info.name,
            transcript,
        })
    }
}

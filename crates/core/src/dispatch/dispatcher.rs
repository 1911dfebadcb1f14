use std::sync::Arc;

use tracing::{debug, instrument};

use super::command::{parse_command, parse_member_arg, Command};
use super::types::{InboundAction, Outcome, Reply};
use crate::calc::{format_result, RateLimitedEvaluator};
use crate::config::{BotConfig, Config};
use crate::lifecycle::{LifecycleController, Transition, TranscriptTrigger};
use crate::platform::{ActorId, ChannelId, ChatPlatform, ControlId, PlatformError};
use crate::state::StateStore;
use crate::ticket::{ServiceRequest, TicketError};
use crate::transcript::TranscriptPublisher;

const NOT_A_TICKET_COMMAND: &str = "❌ This command can only be used in ticket channels.";

/// Routes inbound actions to the lifecycle controller and the calc evaluator.
pub struct Dispatcher {
    controller: Arc<LifecycleController>,
    calc: RateLimitedEvaluator,
    prefix: String,
    dm_notice: Option<String>,
}

impl Dispatcher {
    pub fn new(
        controller: Arc<LifecycleController>,
        calc: RateLimitedEvaluator,
        bot: &BotConfig,
    ) -> Self {
        Self {
            controller,
            calc,
            prefix: bot.command_prefix.clone(),
            dm_notice: bot.dm_notice.clone(),
        }
    }

    /// Wire a dispatcher and its collaborators from configuration, sharing one state store.
    pub fn from_config(
        platform: Arc<dyn ChatPlatform>,
        publisher: Arc<dyn TranscriptPublisher>,
        config: &Config,
    ) -> Self {
        let state = Arc::new(StateStore::new());
        let controller = Arc::new(LifecycleController::new(
            platform,
            publisher,
            Arc::clone(&state),
            config.tickets.clone(),
        ));
        let calc = RateLimitedEvaluator::new(state, config.calc.cooldown());
        Self::new(controller, calc, &config.bot)
    }

    pub fn controller(&self) -> &LifecycleController {
        &self.controller
    }

    pub async fn dispatch(&self, action: InboundAction) -> Outcome {
        match action {
            InboundAction::Message {
                channel,
                author,
                content,
                direct,
            } => self.on_message(channel, author, &content, direct).await,
            InboundAction::Control {
                channel,
                actor,
                custom_id,
                values,
            } => self.on_control(channel, actor, &custom_id, values).await,
            InboundAction::FormSubmission { actor, request } => {
                self.on_form(actor, request).await
            }
        }
    }

    // =========================================================================
    // Messages
    // =========================================================================

    async fn on_message(
        &self,
        channel: ChannelId,
        author: ActorId,
        content: &str,
        direct: bool,
    ) -> Outcome {
        if author == self.controller.system_actor() {
            return Outcome::Ignore;
        }
        if direct {
            return match &self.dm_notice {
                Some(notice) => Reply::public(notice.clone()).into(),
                None => Outcome::Ignore,
            };
        }
        match parse_command(&self.prefix, content) {
            Some(command) => self.run_command(channel, author, command).await,
            None => Outcome::Ignore,
        }
    }

    #[instrument(skip_all, fields(command = command.name(), channel_id = %channel, actor_id = %actor))]
    async fn run_command(&self, channel: ChannelId, actor: ActorId, command: Command) -> Outcome {
        let lifecycle = &self.controller;
        match command {
            Command::Panel => match lifecycle.post_panel(channel, actor).await {
                Ok(()) => Outcome::Ignore,
                Err(e) => Reply::public(e.to_string()).into(),
            },
            Command::Setup => match lifecycle.setup(actor).await {
                Ok(report) => {
                    Reply::public(report.summary(lifecycle.category_name())).into()
                }
                Err(e) => Reply::public(e.to_string()).into(),
            },
            Command::Rename(name) => {
                if name.is_empty() {
                    return Reply::public(format!("Usage: `{}rename <name>`", self.prefix)).into();
                }
                match lifecycle.rename(channel, actor, &name).await {
                    Ok(applied) => {
                        Reply::public(format!("✅ Ticket renamed to: `{}`", applied)).into()
                    }
                    Err(TicketError::NotATicket) => Reply::public(NOT_A_TICKET_COMMAND).into(),
                    Err(TicketError::PlatformOperationFailed(PlatformError::Forbidden(_))) => {
                        Reply::public("❌ I don't have permission to rename this channel.").into()
                    }
                    Err(TicketError::PlatformOperationFailed(e)) => {
                        Reply::public(format!("❌ Failed to rename channel: {}", e)).into()
                    }
                    Err(e) => Reply::public(format!("❌ {}", e)).into(),
                }
            }
            Command::Add(arg) => {
                let Some(target) = parse_member_arg(&arg) else {
                    return self.member_usage("add");
                };
                match lifecycle.add_member(channel, actor, target).await {
                    Ok(_) => Reply::public(format!("Added {} to ticket.", target.mention())).into(),
                    Err(e) => Reply::public(e.to_string()).into(),
                }
            }
            Command::Remove(arg) => {
                let Some(target) = parse_member_arg(&arg) else {
                    return self.member_usage("remove");
                };
                match lifecycle.remove_member(channel, actor, target).await {
                    Ok(_) => {
                        Reply::public(format!("Removed {} from ticket.", target.mention())).into()
                    }
                    Err(e) => Reply::public(e.to_string()).into(),
                }
            }
            Command::Open => match lifecycle.reopen(channel, actor).await {
                Ok(Transition::Applied) => Outcome::Ignore,
                Ok(Transition::Unchanged) => Reply::public("Ticket is already open.").into(),
                Err(e) => Reply::public(e.to_string()).into(),
            },
            Command::Close => match lifecycle.close(channel, actor).await {
                Ok(Transition::Applied) => Outcome::Ignore,
                Ok(Transition::Unchanged) => Reply::public("Ticket is already closed.").into(),
                Err(e) => Reply::public(e.to_string()).into(),
            },
            Command::Transcript => {
                match lifecycle
                    .transcript(channel, actor, TranscriptTrigger::Command)
                    .await
                {
                    Ok(published) => Reply::public(format!(
                        "✅ Transcript generated!\n🌐 View it at: {}",
                        published.url
                    ))
                    .into(),
                    Err(TicketError::NotATicket) => Reply::public(NOT_A_TICKET_COMMAND).into(),
                    Err(TicketError::TranscriptGenerationFailed(_)) => {
                        Reply::public("❌ Failed to generate transcript.").into()
                    }
                    Err(e) => Reply::public(format!("❌ {}", e)).into(),
                }
            }
            Command::Delete => self.delete(channel, actor, false).await,
            Command::Calc(expression) => match self.calc.evaluate_now(actor, &expression).await {
                Ok(value) => Reply::public(format_result(value)).into(),
                Err(e) => Reply::public(format!("⚠️ {}", e)).into(),
            },
        }
    }

    fn member_usage(&self, command: &str) -> Outcome {
        Reply::public(format!(
            "Usage: `{}{} <member>` (a mention or numeric id)",
            self.prefix, command
        ))
        .into()
    }

    async fn delete(&self, channel: ChannelId, actor: ActorId, ephemeral: bool) -> Outcome {
        let reply = match self.controller.delete(channel, actor).await {
            Ok(outcome) => match outcome.transcript {
                Ok(published) => format!(
                    "Deleted #{}. Transcript saved: {}",
                    outcome.channel_name, published.url
                ),
                Err(e) => format!(
                    "Deleted #{}, but the transcript failed: {}",
                    outcome.channel_name, e
                ),
            },
            Err(e @ TicketError::PlatformOperationFailed(_)) => {
                format!("Error during deletion: {}", e)
            }
            Err(e) => e.to_string(),
        };
        Reply {
            content: reply,
            ephemeral,
        }
        .into()
    }

    // =========================================================================
    // Controls and forms
    // =========================================================================

    async fn on_control(
        &self,
        channel: ChannelId,
        actor: ActorId,
        custom_id: &str,
        values: Vec<String>,
    ) -> Outcome {
        let Some(control) = ControlId::from_custom_id(custom_id) else {
            debug!(custom_id, "Ignoring unknown control");
            return Outcome::Ignore;
        };
        let lifecycle = &self.controller;

        match control {
            ControlId::TicketTypeSelect => {
                let Some(choice) = values.first() else {
                    return Reply::ephemeral("Invalid ticket type selected.").into();
                };
                match lifecycle.request_form(choice) {
                    Ok(form) => Outcome::ShowForm(form),
                    Err(e) => Reply::ephemeral(e.to_string()).into(),
                }
            }
            ControlId::CloseTicket => match lifecycle.close(channel, actor).await {
                Ok(Transition::Applied) => Reply::ephemeral("Ticket closed.").into(),
                Ok(Transition::Unchanged) => Reply::ephemeral("Ticket is already closed.").into(),
                Err(e) => Reply::ephemeral(e.to_string()).into(),
            },
            ControlId::OpenTicket => match lifecycle.reopen(channel, actor).await {
                Ok(Transition::Applied) => Reply::ephemeral("Ticket reopened.").into(),
                Ok(Transition::Unchanged) => Reply::ephemeral("Ticket is already open.").into(),
                Err(e) => Reply::ephemeral(e.to_string()).into(),
            },
            ControlId::GenerateTranscript | ControlId::GenerateTranscriptClosed => {
                match lifecycle
                    .transcript(channel, actor, TranscriptTrigger::Control)
                    .await
                {
                    Ok(published) => Reply::ephemeral(format!(
                        "✅ Transcript generated!\n🌐 View it at: {}",
                        published.url
                    ))
                    .into(),
                    Err(TicketError::TranscriptGenerationFailed(e)) => {
                        Reply::ephemeral(format!("❌ Error generating transcript: {}", e)).into()
                    }
                    Err(e) => Reply::ephemeral(e.to_string()).into(),
                }
            }
            ControlId::DeleteTicket | ControlId::DeleteTicketClosed => {
                self.delete(channel, actor, true).await
            }
        }
    }

    async fn on_form(&self, actor: ActorId, request: ServiceRequest) -> Outcome {
        match self.controller.create_ticket(request, actor).await {
            Ok(ticket) => Reply::ephemeral(format!(
                "Created your ticket: {}",
                ticket.channel_id.mention()
            ))
            .into(),
            Err(e) => Reply::ephemeral(e.to_string()).into(),
        }
    }
}

use tracing::{info, warn};

use super::types::{RoleOutcome, SetupReport, SetupStep};
use super::LifecycleController;
use crate::platform::{Access, ActorId, OverwriteTarget, PermissionOverwrite};
use crate::ticket::TicketError;

impl LifecycleController {
    /// Provision staff roles, the ticket category and the transcripts channel.
    ///
    /// Administrators only. A failed role is reported and the next one is
    /// still attempted; a failed category or transcripts channel ends setup.
    /// Completed steps are never rolled back.
    pub async fn setup(&self, actor: ActorId) -> Result<SetupReport, TicketError> {
        self.authorize(actor, None, "setup", |_, m| m.administrator)
            .await?;

        let mut report = SetupReport::default();

        for name in self.policy.staff_roles() {
            let outcome = match self.platform.find_role(name).await? {
                Some(id) => RoleOutcome {
                    name: name.clone(),
                    role: Some(id),
                    step: SetupStep::AlreadyPresent,
                },
                None => match self.platform.create_role(name).await {
                    Ok(id) => {
                        info!(role = %name, role_id = %id, "Created staff role");
                        RoleOutcome {
                            name: name.clone(),
                            role: Some(id),
                            step: SetupStep::Created,
                        }
                    }
                    Err(e) => {
                        warn!(role = %name, error = %e, "Failed to create staff role");
                        RoleOutcome {
                            name: name.clone(),
                            role: None,
                            step: SetupStep::Failed(e.to_string()),
                        }
                    }
                },
            };
            report.roles.push(outcome);
        }

        let staff_roles: Vec<_> = report.roles.iter().filter_map(|r| r.role).collect();
        let system = self.platform.system_actor();

        let category = match self.platform.find_category(&self.config.category_name).await? {
            Some(id) => {
                report.category = Some(SetupStep::AlreadyPresent);
                id
            }
            None => {
                let mut overwrites = vec![
                    PermissionOverwrite::denied(OverwriteTarget::Everyone),
                    PermissionOverwrite::new(OverwriteTarget::Member(system), Access::Manage),
                ];
                overwrites.extend(
                    staff_roles
                        .iter()
                        .map(|r| PermissionOverwrite::read_write(OverwriteTarget::Role(*r))),
                );
                match self
                    .platform
                    .create_category(&self.config.category_name, overwrites)
                    .await
                {
                    Ok(id) => {
                        info!(category_id = %id, name = %self.config.category_name, "Created ticket category");
                        report.category = Some(SetupStep::Created);
                        id
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to create ticket category");
                        report.category = Some(SetupStep::Failed(e.to_string()));
                        return Ok(report);
                    }
                }
            }
        };
        self.state.cache_category(category);

        match self
            .platform
            .find_text_channel(&self.config.transcripts_channel_name)
            .await?
        {
            Some(id) => {
                report.transcripts_channel = Some(SetupStep::AlreadyPresent);
                report.transcripts_channel_id = Some(id);
            }
            None => {
                let mut overwrites = vec![
                    PermissionOverwrite::denied(OverwriteTarget::Everyone),
                    PermissionOverwrite::read_write(OverwriteTarget::Member(system)),
                ];
                overwrites.extend(
                    staff_roles
                        .iter()
                        .map(|r| PermissionOverwrite::new(OverwriteTarget::Role(*r), Access::ReadOnly)),
                );
                match self
                    .platform
                    .create_text_channel(category, &self.config.transcripts_channel_name, overwrites)
                    .await
                {
                    Ok(id) => {
                        info!(channel_id = %id, "Created transcripts channel");
                        report.transcripts_channel = Some(SetupStep::Created);
                        report.transcripts_channel_id = Some(id);
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to create transcripts channel");
                        report.transcripts_channel = Some(SetupStep::Failed(e.to_string()));
                        return Ok(report);
                    }
                }
            }
        }

        info!(actor_id = %actor, "Ticket system setup complete");
        Ok(report)
    }
}

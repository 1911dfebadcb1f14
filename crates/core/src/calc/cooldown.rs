//! Per-actor cooldown entries for the calc command.

use std::collections::HashMap;

use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use super::CalcError;
use crate::platform::ActorId;

/// Next-allowed times, keyed by actor.
///
/// Entries never expire; a later success simply overwrites them.
#[derive(Debug, Default)]
pub struct CooldownTracker {
    entries: Mutex<HashMap<ActorId, Instant>>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `op` unless the actor is still cooling down.
    ///
    /// The entry is held locked across `op`, so two concurrent invocations by
    /// the same actor cannot both pass the check. Only a successful `op` arms
    /// the cooldown.
    pub async fn run<T>(
        &self,
        actor: ActorId,
        now: Instant,
        window: Duration,
        op: impl FnOnce() -> Result<T, CalcError>,
    ) -> Result<T, CalcError> {
        let mut entries = self.entries.lock().await;

        if let Some(&next_allowed) = entries.get(&actor) {
            if now < next_allowed {
                return Err(CalcError::CooldownActive {
                    remaining: next_allowed - now,
                });
            }
        }

        let value = op()?;
        entries.insert(actor, now + window);
        Ok(value)
    }

    /// When the actor may next evaluate, if they are tracked at all.
    pub async fn next_allowed(&self, actor: ActorId) -> Option<Instant> {
        self.entries.lock().await.get(&actor).copied()
    }
}

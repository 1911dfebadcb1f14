//! The ticket lifecycle controller.
//!
//! States run `NONE -> OPEN -> CLOSED -> DELETED`, with `CLOSED -> OPEN` on
//! an explicit reopen. Every operation checks that the channel is a ticket
//! and that the actor is allowed before touching anything.

mod controller;
mod naming;
mod setup;
mod types;

pub use controller::LifecycleController;
pub use naming::{normalize_channel_name, MAX_CHANNEL_NAME_LEN};
pub use types::{DeleteOutcome, RoleOutcome, SetupReport, SetupStep, Transition, TranscriptTrigger};

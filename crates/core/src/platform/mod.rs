//! Chat-platform collaborator: the guild the ticket system lives in.
//!
//! Gateway connection and event delivery stay outside this crate. Everything
//! the ticket core needs from the platform goes through [`ChatPlatform`].

mod controls;
mod traits;
mod types;

pub use controls::{ButtonStyle, ControlId, ControlSet};
pub use traits::{ChatPlatform, MessageStream, PlatformError};
pub use types::*;

//! Inbound dispatch: maps gateway events onto lifecycle and calc operations.

mod command;
mod dispatcher;
mod types;

pub use command::{parse_command, parse_member_arg, Command};
pub use dispatcher::Dispatcher;
pub use types::{InboundAction, Outcome, Reply};

//! Prefix text commands.

use crate::platform::ActorId;

/// A recognised text command with its raw argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Panel,
    Setup,
    Rename(String),
    Add(String),
    Remove(String),
    Open,
    Close,
    Transcript,
    Delete,
    Calc(String),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Panel => "panel",
            Command::Setup => "setup",
            Command::Rename(_) => "rename",
            Command::Add(_) => "add",
            Command::Remove(_) => "remove",
            Command::Open => "open",
            Command::Close => "close",
            Command::Transcript => "transcript",
            Command::Delete => "delete",
            Command::Calc(_) => "calc",
        }
    }
}

/// Parse `content` as a command under `prefix`.
///
/// Returns `None` for anything that is not a known command.
pub fn parse_command(prefix: &str, content: &str) -> Option<Command> {
    let body = content.trim_start().strip_prefix(prefix)?;
    let (name, rest) = match body.find(char::is_whitespace) {
        Some(at) => (&body[..at], body[at..].trim()),
        None => (body, ""),
    };
    let arg = rest.to_string();

    let command = match name {
        "panel" => Command::Panel,
        "setup" => Command::Setup,
        "rename" => Command::Rename(arg),
        "add" => Command::Add(arg),
        "remove" => Command::Remove(arg),
        "open" => Command::Open,
        "close" => Command::Close,
        "transcript" => Command::Transcript,
        "delete" => Command::Delete,
        "calc" => Command::Calc(arg),
        _ => return None,
    };
    Some(command)
}

/// Parse a member argument: a raw id, `<@id>` or `<@!id>`.
pub fn parse_member_arg(arg: &str) -> Option<ActorId> {
    let arg = arg.trim();
    let digits = match arg.strip_prefix("<@").and_then(|s| s.strip_suffix('>')) {
        Some(inner) => inner.strip_prefix('!').unwrap_or(inner),
        None => arg,
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u64>().ok().map(ActorId)
}

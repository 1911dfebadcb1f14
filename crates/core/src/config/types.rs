use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub bot: BotConfig,
    #[serde(default)]
    pub tickets: TicketsConfig,
    #[serde(default)]
    pub transcripts: TranscriptsConfig,
    #[serde(default)]
    pub calc: CalcConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Gateway-facing bot settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    /// Gateway authentication token
    pub token: String,
    /// Prefix for text commands
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
    /// Reply sent to direct messages, if any
    #[serde(default)]
    pub dm_notice: Option<String>,
}

fn default_command_prefix() -> String {
    "$".to_string()
}

/// Ticket workflow settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TicketsConfig {
    /// Name of the category that contains ticket channels
    #[serde(default = "default_category_name")]
    pub category_name: String,
    /// Name of the channel transcript links are posted to
    #[serde(default = "default_transcripts_channel_name")]
    pub transcripts_channel_name: String,
    /// Roles that may rename tickets and pull transcripts without being staff
    #[serde(default = "default_support_roles")]
    pub support_roles: Vec<String>,
    /// Pause between publishing the final transcript and deleting the channel
    #[serde(default = "default_delete_grace_secs")]
    pub delete_grace_secs: u64,
}

impl TicketsConfig {
    pub fn delete_grace(&self) -> Duration {
        Duration::from_secs(self.delete_grace_secs)
    }
}

impl Default for TicketsConfig {
    fn default() -> Self {
        Self {
            category_name: default_category_name(),
            transcripts_channel_name: default_transcripts_channel_name(),
            support_roles: default_support_roles(),
            delete_grace_secs: default_delete_grace_secs(),
        }
    }
}

fn default_category_name() -> String {
    "TICKETS".to_string()
}

fn default_transcripts_channel_name() -> String {
    "ticket-transcripts".to_string()
}

fn default_support_roles() -> Vec<String> {
    vec!["Support Team".to_string()]
}

fn default_delete_grace_secs() -> u64 {
    5
}

/// Transcript storage and links
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranscriptsConfig {
    /// Directory rendered transcripts are written to
    #[serde(default = "default_transcripts_dir")]
    pub dir: PathBuf,
    /// Public base URL of the transcript server
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for TranscriptsConfig {
    fn default() -> Self {
        Self {
            dir: default_transcripts_dir(),
            base_url: default_base_url(),
        }
    }
}

fn default_transcripts_dir() -> PathBuf {
    PathBuf::from("static/transcripts")
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

/// Ad-hoc calculator settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CalcConfig {
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
}

impl CalcConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

impl Default for CalcConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: default_cooldown_secs(),
        }
    }
}

fn default_cooldown_secs() -> u64 {
    30
}

/// Transcript HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    5000
}

/// Sanitized config for API responses (token redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub bot: SanitizedBotConfig,
    pub tickets: TicketsConfig,
    pub transcripts: TranscriptsConfig,
    pub calc: CalcConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedBotConfig {
    pub token_configured: bool,
    pub command_prefix: String,
    pub dm_notice_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            bot: SanitizedBotConfig {
                token_configured: !config.bot.token.is_empty(),
                command_prefix: config.bot.command_prefix.clone(),
                dm_notice_configured: config.bot.dm_notice.is_some(),
            },
            tickets: config.tickets.clone(),
            transcripts: config.transcripts.clone(),
            calc: config.calc.clone(),
            server: config.server.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_config() {
        let toml = r#"
[bot]
token = "abc"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.bot.token, "abc");
        assert_eq!(config.bot.command_prefix, "$");
        assert!(config.bot.dm_notice.is_none());
        assert_eq!(config.tickets.category_name, "TICKETS");
        assert_eq!(config.tickets.transcripts_channel_name, "ticket-transcripts");
        assert_eq!(config.tickets.support_roles, vec!["Support Team"]);
        assert_eq!(config.tickets.delete_grace(), Duration::from_secs(5));
        assert_eq!(config.transcripts.dir, PathBuf::from("static/transcripts"));
        assert_eq!(config.transcripts.base_url, "http://localhost:5000");
        assert_eq!(config.calc.cooldown(), Duration::from_secs(30));
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[bot]
token = "abc"
command_prefix = "!"
dm_notice = "Please use the server."

[tickets]
category_name = "MIDDLEMAN"
transcripts_channel_name = "logs"
support_roles = []
delete_grace_secs = 0

[transcripts]
dir = "/srv/transcripts"
base_url = "https://transcripts.example.com"

[calc]
cooldown_secs = 10

[server]
host = "127.0.0.1"
port = 9000
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.bot.command_prefix, "!");
        assert_eq!(config.bot.dm_notice.as_deref(), Some("Please use the server."));
        assert_eq!(config.tickets.category_name, "MIDDLEMAN");
        assert!(config.tickets.support_roles.is_empty());
        assert_eq!(config.tickets.delete_grace(), Duration::ZERO);
        assert_eq!(config.transcripts.base_url, "https://transcripts.example.com");
        assert_eq!(config.calc.cooldown_secs, 10);
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_deserialize_missing_bot_fails() {
        let toml = r#"
[server]
port = 8080
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_sanitized_config_hides_token() {
        let config: Config = toml::from_str("[bot]\ntoken = \"super-secret\"\n").unwrap();
        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.bot.token_configured);
        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("super-secret"));
    }
}

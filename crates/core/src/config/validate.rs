use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Bot token is present
/// - Server port is not 0
/// - Ticket category name is not empty
/// - Transcript base URL is http(s)
/// - Calc cooldown is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.bot.token.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "bot.token cannot be empty".to_string(),
        ));
    }

    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.tickets.category_name.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "tickets.category_name cannot be empty".to_string(),
        ));
    }

    let base_url = &config.transcripts.base_url;
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::ValidationError(format!(
            "transcripts.base_url must be an http(s) URL, got '{}'",
            base_url
        )));
    }

    if config.calc.cooldown_secs == 0 {
        return Err(ConfigError::ValidationError(
            "calc.cooldown_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    fn valid() -> Config {
        load_config_from_str("[bot]\ntoken = \"t\"\n").unwrap()
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = valid();
        config.server.port = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_empty_token_fails() {
        let mut config = valid();
        config.bot.token = "  ".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_empty_category_fails() {
        let mut config = valid();
        config.tickets.category_name = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_base_url_scheme() {
        let mut config = valid();
        config.transcripts.base_url = "ftp://example.com".to_string();
        assert!(validate_config(&config).is_err());

        config.transcripts.base_url = "https://example.com".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_zero_cooldown_fails() {
        let mut config = valid();
        config.calc.cooldown_secs = 0;
        assert!(validate_config(&config).is_err());
    }
}

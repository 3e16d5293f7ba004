//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{
    BotSection, ClientSection, CourierConfig, LogOutput, LoggingConfig, TRUE_RETURNING,
    WebhookSection,
};

/// Validates the entire configuration.
pub fn validate_config(config: &CourierConfig) -> ConfigResult<()> {
    validate_bot_config(&config.bot)?;
    validate_client_config(&config.client)?;
    validate_webhook_config(&config.webhook)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

fn validate_bot_config(bot: &BotSection) -> ConfigResult<()> {
    if bot.token.is_empty() {
        return Err(ConfigError::missing_field("bot.token"));
    }
    if bot.token.contains(char::is_whitespace) || bot.token.contains('/') {
        return Err(ConfigError::validation(
            "Bot token cannot contain whitespace or '/'",
        ));
    }
    Ok(())
}

fn validate_client_config(client: &ClientSection) -> ConfigResult<()> {
    validate_url(&client.api_root)?;

    if client.timeout_secs == 0 {
        return Err(ConfigError::validation(
            "Client timeout must be greater than 0",
        ));
    }

    for method in &client.webhook_reply_methods {
        if method.trim().is_empty() {
            return Err(ConfigError::validation(
                "Webhook reply method names cannot be empty",
            ));
        }
        if method.starts_with('*') && method != TRUE_RETURNING {
            return Err(ConfigError::validation(format!(
                "Unknown webhook reply method group: {method}. Only {TRUE_RETURNING} is supported"
            )));
        }
    }

    Ok(())
}

fn validate_webhook_config(webhook: &WebhookSection) -> ConfigResult<()> {
    validate_port(webhook.port)?;
    validate_path(&webhook.path)?;

    if webhook.timeout_secs == 0 {
        return Err(ConfigError::validation(
            "Webhook timeout must be greater than 0",
        ));
    }

    if let Some(secret) = &webhook.secret_token {
        validate_secret_token(secret)?;
    }

    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }
    Ok(())
}

/// Validates the Bot API root URL.
fn validate_url(url: &str) -> ConfigResult<()> {
    if url.is_empty() {
        return Err(ConfigError::missing_field("client.api_root"));
    }

    let valid_schemes = ["http://", "https://"];
    if !valid_schemes.iter().any(|s| url.starts_with(s)) {
        return Err(ConfigError::invalid_url(
            url,
            format!("URL must start with one of: {valid_schemes:?}"),
        ));
    }

    Ok(())
}

fn validate_port(port: u16) -> ConfigResult<()> {
    if port == 0 {
        return Err(ConfigError::InvalidPort(port));
    }
    Ok(())
}

fn validate_path(path: &str) -> ConfigResult<()> {
    if !path.starts_with('/') {
        return Err(ConfigError::validation("Path must start with '/'"));
    }
    Ok(())
}

/// The Bot API accepts 1-256 characters from `A-Z`, `a-z`, `0-9`, `_` and `-`.
fn validate_secret_token(secret: &str) -> ConfigResult<()> {
    let valid_chars = secret
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if secret.is_empty() || secret.len() > 256 || !valid_chars {
        return Err(ConfigError::validation(
            "Webhook secret token must be 1-256 characters of A-Z, a-z, 0-9, '_' or '-'",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> CourierConfig {
        let mut config = CourierConfig::default();
        config.bot.token = "123456:ABC-DEF".to_string();
        config
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_missing_token() {
        let result = validate_config(&CourierConfig::default());
        assert!(matches!(result, Err(ConfigError::MissingField { ref field }) if field == "bot.token"));
    }

    #[test]
    fn test_validate_zero_timeouts() {
        let mut config = valid_config();
        config.client.timeout_secs = 0;
        assert!(validate_config(&config).is_err());

        let mut config = valid_config();
        config.webhook.timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_api_root() {
        let mut config = valid_config();
        config.client.api_root = "api.telegram.org".to_string();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_validate_webhook_path_and_port() {
        let mut config = valid_config();
        config.webhook.path = "hook".to_string();
        assert!(validate_config(&config).is_err());

        let mut config = valid_config();
        config.webhook.port = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidPort(0))
        ));
    }

    #[test]
    fn test_validate_secret_token() {
        let mut config = valid_config();
        config.webhook.secret_token = Some("has spaces".to_string());
        assert!(validate_config(&config).is_err());

        config.webhook.secret_token = Some("Good_secret-1".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_reply_methods() {
        let mut config = valid_config();
        config.client.webhook_reply_methods = vec![TRUE_RETURNING.to_string()];
        assert!(validate_config(&config).is_ok());

        config.client.webhook_reply_methods = vec!["*all".to_string()];
        assert!(validate_config(&config).is_err());

        config.client.webhook_reply_methods = vec![" ".to_string()];
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_file_output_needs_path() {
        let mut config = valid_config();
        config.logging.output = LogOutput::File;
        assert!(validate_config(&config).is_err());

        config.logging.file_path = Some("courier.log".into());
        assert!(validate_config(&config).is_ok());
    }
}

//! Configuration schema definitions.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use courier_core::{
    ClientConfig, DEFAULT_API_ROOT, DEFAULT_TIMEOUT_SECS, Environment, WebhookReplyPredicate,
    webhook,
};
use courier_transport::{OnTimeout, WebhookOptions};
use serde::{Deserialize, Serialize};

/// Entry of [`ClientSection::webhook_reply_methods`] that stands for every
/// registry method returning only `true`.
pub const TRUE_RETURNING: &str = "*true";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CourierConfig {
    /// Bot credentials.
    #[serde(default)]
    pub bot: BotSection,

    /// Bot API client settings.
    #[serde(default)]
    pub client: ClientSection,

    /// Webhook endpoint settings.
    #[serde(default)]
    pub webhook: WebhookSection,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Bot credentials.
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct BotSection {
    /// Token issued by BotFather.
    #[serde(default)]
    pub token: String,
}

impl fmt::Debug for BotSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotSection")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

// =============================================================================
// Client
// =============================================================================

/// Bot API client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSection {
    /// Root URL of the Bot API server.
    #[serde(default = "default_api_root")]
    pub api_root: String,

    /// `prod` or `test`.
    #[serde(default)]
    pub environment: Environment,

    /// Per-call timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Keep the bot token in error messages.
    #[serde(default)]
    pub sensitive_logs: bool,

    /// Methods that may be answered through the webhook response.
    ///
    /// `"*true"` enables every method whose result is always `true`.
    #[serde(default)]
    pub webhook_reply_methods: Vec<String>,
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            api_root: default_api_root(),
            environment: Environment::default(),
            timeout_secs: default_timeout_secs(),
            sensitive_logs: false,
            webhook_reply_methods: Vec::new(),
        }
    }
}

impl ClientSection {
    /// Builds the webhook reply predicate from `webhook_reply_methods`.
    pub fn reply_predicate(&self) -> WebhookReplyPredicate {
        if self.webhook_reply_methods.is_empty() {
            return webhook::never();
        }

        let true_returning = self
            .webhook_reply_methods
            .iter()
            .any(|m| m == TRUE_RETURNING);
        let listed = webhook::only(
            self.webhook_reply_methods
                .iter()
                .filter(|m| m.as_str() != TRUE_RETURNING)
                .cloned(),
        );

        if !true_returning {
            return listed;
        }
        let returns_true = webhook::true_returning();
        let combined: WebhookReplyPredicate =
            Arc::new(move |method: &str| returns_true(method) || listed(method));
        combined
    }

    /// Converts to the client core configuration.
    pub fn to_client_config(&self) -> ClientConfig {
        ClientConfig::new()
            .with_api_root(self.api_root.clone())
            .with_environment(self.environment)
            .with_timeout_secs(self.timeout_secs)
            .with_sensitive_logs(self.sensitive_logs)
            .with_webhook_reply_predicate(self.reply_predicate())
    }
}

fn default_api_root() -> String {
    DEFAULT_API_ROOT.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

// =============================================================================
// Webhook
// =============================================================================

/// Webhook endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookSection {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path the updates are POSTed to.
    #[serde(default = "default_webhook_path")]
    pub path: String,

    /// Secret passed to `setWebhook` and checked on every request.
    #[serde(default)]
    pub secret_token: Option<String>,

    /// Seconds to wait for the handler before applying `on_timeout`.
    #[serde(default = "default_webhook_timeout_secs")]
    pub timeout_secs: u64,

    /// `fail` or `return`.
    #[serde(default)]
    pub on_timeout: OnTimeout,
}

impl Default for WebhookSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            path: default_webhook_path(),
            secret_token: None,
            timeout_secs: default_webhook_timeout_secs(),
            on_timeout: OnTimeout::default(),
        }
    }
}

impl WebhookSection {
    /// `host:port` to bind.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Converts to the server options.
    pub fn to_options(&self) -> WebhookOptions {
        let options = WebhookOptions::default()
            .with_path(self.path.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_on_timeout(self.on_timeout);
        match &self.secret_token {
            Some(secret) => options.with_secret_token(secret.clone()),
            None => options,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8443
}

fn default_webhook_path() -> String {
    "/".to_string()
}

fn default_webhook_timeout_secs() -> u64 {
    10
}

// =============================================================================
// Logging
// =============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature.
    Json,
}

/// Where log lines go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// Log file rollover period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    #[default]
    Never,
    Hourly,
    Daily,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SpanEventConfig {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub enter: bool,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub close: bool,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: LogLevel,

    #[serde(default)]
    pub format: LogFormat,

    #[serde(default)]
    pub output: LogOutput,

    #[serde(default)]
    pub span_events: SpanEventConfig,

    /// Include thread IDs.
    #[serde(default)]
    pub thread_ids: bool,

    /// Include file names and line numbers.
    #[serde(default)]
    pub file_location: bool,

    /// Log file, required when `output` is `file`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// How often the log file is rolled over.
    #[serde(default)]
    pub rotation: LogRotation,

    /// Per-module levels, e.g. `courier_core = "debug"`.
    #[serde(default)]
    pub filters: HashMap<String, LogLevel>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            output: LogOutput::default(),
            span_events: SpanEventConfig::default(),
            thread_ids: false,
            file_location: false,
            file_path: None,
            rotation: LogRotation::default(),
            filters: HashMap::new(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn client_with(methods: &[&str]) -> ClientSection {
        ClientSection {
            webhook_reply_methods: methods.iter().map(|m| m.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_reply_predicate_defaults_to_never() {
        let predicate = ClientSection::default().reply_predicate();
        assert!(!predicate("sendMessage"));
        assert!(!predicate("sendChatAction"));
    }

    #[test]
    fn test_reply_predicate_listed_methods() {
        let predicate = client_with(&["sendMessage"]).reply_predicate();
        assert!(predicate("sendMessage"));
        assert!(!predicate("sendPhoto"));
    }

    #[test]
    fn test_reply_predicate_true_returning() {
        let predicate = client_with(&[TRUE_RETURNING, "sendMessage"]).reply_predicate();
        assert!(predicate("sendChatAction"));
        assert!(predicate("deleteMessage"));
        assert!(predicate("sendMessage"));
        assert!(!predicate("getMe"));
    }

    #[test]
    fn test_to_client_config() {
        let section = ClientSection {
            api_root: "http://localhost:8081".to_string(),
            environment: Environment::Test,
            timeout_secs: 30,
            sensitive_logs: true,
            webhook_reply_methods: Vec::new(),
        };
        let config = section.to_client_config();
        assert_eq!(config.api_root, "http://localhost:8081");
        assert_eq!(config.environment, Environment::Test);
        assert_eq!(config.timeout_secs, 30);
        assert!(config.sensitive_logs);
    }

    #[test]
    fn test_webhook_options() {
        let section = WebhookSection {
            secret_token: Some("s3cret".to_string()),
            on_timeout: OnTimeout::Return,
            timeout_secs: 3,
            path: "/hook".to_string(),
            ..Default::default()
        };
        let options = section.to_options();
        assert_eq!(options.path, "/hook");
        assert_eq!(options.secret_token.as_deref(), Some("s3cret"));
        assert_eq!(options.timeout, Duration::from_secs(3));
        assert_eq!(options.on_timeout, OnTimeout::Return);
        assert_eq!(section.address(), "0.0.0.0:8443");
    }

    #[test]
    fn test_token_not_in_debug() {
        let bot = BotSection {
            token: "123:abc".to_string(),
        };
        assert!(!format!("{bot:?}").contains("123:abc"));
    }
}

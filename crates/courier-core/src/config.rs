//! Client configuration.

use std::fmt;
use std::sync::Arc;

use crate::url::{Environment, UrlBuilder, default_url_builder};
use crate::webhook::{self, WebhookReplyPredicate};

/// Default Bot API root.
pub const DEFAULT_API_ROOT: &str = "https://api.telegram.org";

/// Default per-call timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 500;

/// Settings fixed when a [`RawApi`](crate::RawApi) is constructed.
#[derive(Clone)]
pub struct ClientConfig {
    /// Root URL passed to the URL builder.
    pub api_root: String,
    /// Environment used by the default URL builder.
    pub environment: Environment,
    /// Custom URL builder; `None` uses the default for `environment`.
    pub build_url: Option<UrlBuilder>,
    /// Per-call timeout in whole seconds.
    pub timeout_secs: u64,
    /// Which methods may be folded into a webhook reply.
    pub can_use_webhook_reply: WebhookReplyPredicate,
    /// Keep the bot token in error messages.
    pub sensitive_logs: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_root: DEFAULT_API_ROOT.to_string(),
            environment: Environment::Prod,
            build_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            can_use_webhook_reply: webhook::never(),
            sensitive_logs: false,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_root", &self.api_root)
            .field("environment", &self.environment)
            .field("custom_url_builder", &self.build_url.is_some())
            .field("timeout_secs", &self.timeout_secs)
            .field("sensitive_logs", &self.sensitive_logs)
            .finish_non_exhaustive()
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API root (e.g. a local Bot API server).
    pub fn with_api_root(mut self, root: impl Into<String>) -> Self {
        self.api_root = root.into();
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Replaces the URL builder.
    pub fn with_url_builder<F>(mut self, build: F) -> Self
    where
        F: Fn(&str, &str, &str) -> String + Send + Sync + 'static,
    {
        self.build_url = Some(Arc::new(build));
        self
    }

    pub fn with_timeout_secs(mut self, seconds: u64) -> Self {
        self.timeout_secs = seconds;
        self
    }

    /// Sets the webhook reply predicate.
    pub fn with_webhook_reply<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.can_use_webhook_reply = Arc::new(predicate);
        self
    }

    /// Sets an already shared webhook reply predicate.
    pub fn with_webhook_reply_predicate(mut self, predicate: WebhookReplyPredicate) -> Self {
        self.can_use_webhook_reply = predicate;
        self
    }

    pub fn with_sensitive_logs(mut self, enabled: bool) -> Self {
        self.sensitive_logs = enabled;
        self
    }

    /// The URL builder in effect.
    pub fn url_builder(&self) -> UrlBuilder {
        self.build_url
            .clone()
            .unwrap_or_else(|| default_url_builder(self.environment))
    }
}

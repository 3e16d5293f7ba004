//! Bot bootstrap: configuration, logging, client and webhook server.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use courier_runtime::CourierRuntime;
//! use courier_transport::handler_fn;
//!
//! let runtime = CourierRuntime::builder()
//!     .config_file("courier.toml")
//!     .build()?;
//!
//! runtime
//!     .run(handler_fn(|update, api| async move {
//!         // answer the update through `api`
//!     }))
//!     .await?;
//! ```

use std::path::Path;
use std::sync::Arc;

use courier_core::{BoxedTransport, CallResult, Payload, RawApi};
use courier_transport::{ListenerHandle, ReqwestTransport, UpdateHandler, WebhookServer};
use serde_json::Value;
use tokio::signal;
use tracing::{error, info, warn};

use crate::config::{ConfigLoader, CourierConfig, validate_config};
use crate::error::RuntimeResult;
use crate::logging;

/// A configured bot: one [`RawApi`] plus the webhook settings to serve it.
pub struct CourierRuntime {
    config: CourierConfig,
    api: RawApi,
}

impl CourierRuntime {
    /// Creates a runtime builder.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime over a reqwest transport.
    ///
    /// Validates `config` and initializes logging from it.
    pub fn from_config(config: CourierConfig) -> RuntimeResult<Self> {
        let transport: BoxedTransport = Arc::new(ReqwestTransport::new()?);
        Self::with_transport(config, transport)
    }

    /// Creates a runtime over an already built transport.
    pub fn with_transport(config: CourierConfig, transport: BoxedTransport) -> RuntimeResult<Self> {
        validate_config(&config)?;
        logging::init_from_config(&config.logging);

        let api = RawApi::with_transport(
            config.bot.token.clone(),
            config.client.to_client_config(),
            transport,
        );

        info!(
            api_root = %config.client.api_root,
            environment = %config.client.environment,
            timeout_secs = config.client.timeout_secs,
            reply_methods = ?config.client.webhook_reply_methods,
            "Courier runtime created"
        );

        Ok(Self { config, api })
    }

    pub fn config(&self) -> &CourierConfig {
        &self.config
    }

    /// The bot's client. Install transformers here before serving.
    pub fn api(&self) -> &RawApi {
        &self.api
    }

    /// Points the bot's webhook at `url`, passing the configured secret
    /// token.
    pub async fn register_webhook(&self, url: &str) -> CallResult<Value> {
        let mut payload = Payload::new().with("url", url);
        if let Some(secret) = &self.config.webhook.secret_token {
            payload.insert("secret_token", secret.as_str());
        }
        self.api.set_webhook(payload, None).await
    }

    /// Starts the webhook server on the configured address.
    pub async fn serve(&self, handler: UpdateHandler) -> RuntimeResult<ListenerHandle> {
        let handle = WebhookServer::new(self.api.clone(), handler)
            .with_options(self.config.webhook.to_options())
            .listen(&self.config.webhook.address())
            .await?;
        Ok(handle)
    }

    /// Serves until Ctrl+C or SIGTERM.
    pub async fn run(&self, handler: UpdateHandler) -> RuntimeResult<()> {
        self.run_until(handler, wait_for_shutdown()).await
    }

    /// Serves until `shutdown` completes.
    pub async fn run_until<F>(&self, handler: UpdateHandler, shutdown: F) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        let handle = self.serve(handler).await?;
        info!(addr = %handle.local_addr, "Courier is now running");

        shutdown.await;

        handle.stop();
        info!("Courier stopped");
        Ok(())
    }
}

/// Waits for Ctrl+C or, on Unix, SIGTERM.
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = signal::ctrl_c() => info!("Received Ctrl+C, shutting down"),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
                }
                return;
            }
            Err(e) => warn!(error = %e, "Failed to register SIGTERM handler"),
        }
    }

    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => error!(error = %e, "Failed to listen for Ctrl+C, shutting down"),
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for a [`CourierRuntime`] with layered configuration.
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
    transport: Option<BoxedTransport>,
}

impl RuntimeBuilder {
    /// Searches the current directory for configuration files.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new().with_current_dir(),
            transport: None,
        }
    }

    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    pub fn with_env(mut self) -> Self {
        self.config_loader = self.config_loader.with_env();
        self
    }

    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges configuration built in code.
    pub fn merge(mut self, config: CourierConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Uses `transport` instead of a default reqwest client.
    pub fn transport(mut self, transport: BoxedTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Loads and validates the configuration, then builds the runtime.
    pub fn build(self) -> RuntimeResult<CourierRuntime> {
        let config = self.config_loader.load()?;
        match self.transport {
            Some(transport) => CourierRuntime::with_transport(config, transport),
            None => CourierRuntime::from_config(config),
        }
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use courier_core::{HttpResponse, HttpTransport, RequestBody};
    use serde_json::json;
    use tokio_test::assert_ok;

    use super::*;
    use crate::config::{BotSection, ConfigError};
    use crate::error::RuntimeError;

    #[derive(Default)]
    struct RecordingTransport {
        calls: Mutex<Vec<(String, String, Value)>>,
    }

    #[async_trait]
    impl HttpTransport for RecordingTransport {
        async fn post(
            &self,
            method: &str,
            url: &str,
            body: RequestBody,
        ) -> CallResult<HttpResponse> {
            let body = match body {
                RequestBody::Json(bytes) => serde_json::from_slice(&bytes).unwrap(),
                RequestBody::Multipart(_) => Value::Null,
            };
            self.calls
                .lock()
                .unwrap()
                .push((method.to_string(), url.to_string(), body));
            Ok(HttpResponse::new(200, r#"{"ok":true,"result":true}"#))
        }
    }

    fn config(token: &str) -> CourierConfig {
        CourierConfig {
            bot: BotSection {
                token: token.to_string(),
            },
            ..Default::default()
        }
    }

    fn build(
        config: CourierConfig,
        transport: Arc<RecordingTransport>,
    ) -> RuntimeResult<CourierRuntime> {
        CourierRuntime::builder()
            .search_path("/nonexistent/courier")
            .without_env()
            .merge(config)
            .transport(transport)
            .build()
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let result = build(config(""), Arc::default());
        assert!(matches!(
            result,
            Err(RuntimeError::Config(ConfigError::MissingField { .. }))
        ));
    }

    #[tokio::test]
    async fn test_api_uses_configured_client() {
        let transport = Arc::new(RecordingTransport::default());
        let mut config = config("123:abc");
        config.client.api_root = "http://localhost:8081".to_string();
        let runtime = build(config, Arc::clone(&transport)).unwrap();

        assert_eq!(runtime.api().token(), "123:abc");
        assert_ok!(runtime.api().get_me(Payload::new(), None).await);

        let calls = transport.calls.lock().unwrap();
        assert_eq!(calls[0].0, "getMe");
        assert_eq!(calls[0].1, "http://localhost:8081/bot123:abc/getMe");
    }

    #[tokio::test]
    async fn test_register_webhook_sends_secret() {
        let transport = Arc::new(RecordingTransport::default());
        let mut config = config("123:abc");
        config.webhook.secret_token = Some("s3cret".to_string());
        let runtime = build(config, Arc::clone(&transport)).unwrap();

        let result = runtime
            .register_webhook("https://bot.example.com/hook")
            .await
            .unwrap();
        assert_eq!(result, json!(true));

        let calls = transport.calls.lock().unwrap();
        assert_eq!(calls[0].0, "setWebhook");
        assert_eq!(
            calls[0].2,
            json!({ "url": "https://bot.example.com/hook", "secret_token": "s3cret" })
        );
    }

    #[tokio::test]
    async fn test_run_until_stops_server() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let mut config = config("123:abc");
        config.webhook.host = "127.0.0.1".to_string();
        config.webhook.port = port;
        let runtime = build(config, Arc::default()).unwrap();

        let handler = courier_transport::handler_fn(|_, _| async {});
        assert_ok!(runtime.run_until(handler, async {}).await);
    }
}

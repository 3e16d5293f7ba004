//! The raw API dispatcher.
//!
//! [`RawApi`] turns a method name and its arguments into one transmission:
//!
//! 1. a [`MethodCall`] is built and sent through the installed transformers;
//! 2. the innermost step either folds the call into the pending webhook
//!    reply or POSTs it to the URL produced by the URL builder;
//! 3. the envelope is unwrapped into the `result`, or into an
//!    [`ApiError`](crate::ApiError).
//!
//! # Timeouts and cancellation
//!
//! Every transmission, folded or not, races the configured timeout and, when
//! given, the caller's abort signal. Whichever fires first drops the request
//! future, which closes the connection. A webhook reply the sink refuses is
//! sent over the network instead. HTTP is at-most-once: after a timeout or
//! abort the Bot API may or may not have received the request, and nothing
//! is rolled back.

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::codec;
use crate::config::ClientConfig;
use crate::envelope::Envelope;
use crate::error::{CallError, CallResult, CodecError, ConfigError, TransportError, redact};
use crate::payload::{MethodCall, Payload};
use crate::transformer::{ApiCallFn, BoxedTransformer, Transformer, TransformerChain};
use crate::transport::{BoxedTransport, HttpTransport};
use crate::url::UrlBuilder;
use crate::webhook::WebhookReplySlot;

struct ClientInner {
    token: String,
    config: ClientConfig,
    url_builder: UrlBuilder,
    transport: BoxedTransport,
}

/// Raw Bot API client.
///
/// Cloning is cheap and clones share the installed transformers. A client
/// bound to one webhook update is made with
/// [`with_webhook_reply`](Self::with_webhook_reply).
#[derive(Clone)]
pub struct RawApi {
    inner: Arc<ClientInner>,
    transformers: Arc<RwLock<TransformerChain>>,
    webhook_reply: Option<Arc<WebhookReplySlot>>,
}

impl RawApi {
    /// Creates a client for `token`.
    pub fn new(
        token: impl Into<String>,
        config: ClientConfig,
        transport: impl HttpTransport + 'static,
    ) -> Self {
        Self::with_transport(token, config, Arc::new(transport))
    }

    /// Creates a client over an already shared transport.
    pub fn with_transport(
        token: impl Into<String>,
        config: ClientConfig,
        transport: BoxedTransport,
    ) -> Self {
        let url_builder = config.url_builder();
        Self {
            inner: Arc::new(ClientInner {
                token: token.into(),
                config,
                url_builder,
                transport,
            }),
            transformers: Arc::new(RwLock::new(TransformerChain::new())),
            webhook_reply: None,
        }
    }

    pub fn token(&self) -> &str {
        &self.inner.token
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Appends a transformer. Transformers added first run outermost.
    pub fn use_transformer(&self, transformer: impl Transformer) -> &Self {
        self.transformers.write().push(transformer);
        self
    }

    /// Appends an already shared transformer.
    pub fn use_boxed_transformer(&self, transformer: BoxedTransformer) -> &Self {
        self.transformers.write().push_boxed(transformer);
        self
    }

    /// Snapshot of the installed transformers, outermost first.
    pub fn installed_transformers(&self) -> Vec<BoxedTransformer> {
        self.transformers.read().iter().cloned().collect()
    }

    /// A client for handling one webhook update.
    ///
    /// It starts with a copy of this client's transformers; transformers
    /// added to it later do not leak back.
    pub fn with_webhook_reply(&self, slot: Arc<WebhookReplySlot>) -> Self {
        let chain = self.transformers.read().clone();
        Self {
            inner: Arc::clone(&self.inner),
            transformers: Arc::new(RwLock::new(chain)),
            webhook_reply: Some(slot),
        }
    }

    /// The reply slot this client is bound to, if any.
    pub fn webhook_reply(&self) -> Option<&Arc<WebhookReplySlot>> {
        self.webhook_reply.as_ref()
    }

    /// Calls `method` and returns the unwrapped `result`.
    pub async fn call(
        &self,
        method: &str,
        payload: Payload,
        signal: Option<CancellationToken>,
    ) -> CallResult<Value> {
        let handler = self.transformers.read().compose(self.base_call());
        let envelope = handler(MethodCall::new(method, payload), signal).await?;
        envelope.into_result(method).map_err(CallError::Api)
    }

    /// Calls `method` and deserializes the `result` into `T`.
    pub async fn call_as<T: DeserializeOwned>(
        &self,
        method: &str,
        payload: Payload,
        signal: Option<CancellationToken>,
    ) -> CallResult<T> {
        let result = self.call(method, payload, signal).await?;
        serde_json::from_value(result).map_err(|e| {
            CodecError::Result {
                method: method.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// The innermost step of the chain.
    fn base_call(&self) -> ApiCallFn {
        let inner = Arc::clone(&self.inner);
        let slot = self.webhook_reply.clone();
        Arc::new(move |call: MethodCall, signal: Option<CancellationToken>| {
            let inner = Arc::clone(&inner);
            let slot = slot.clone();
            async move { inner.transmit(slot.as_deref(), call, signal).await }.boxed()
        })
    }
}

impl ClientInner {
    async fn transmit(
        &self,
        slot: Option<&WebhookReplySlot>,
        call: MethodCall,
        signal: Option<CancellationToken>,
    ) -> CallResult<Envelope> {
        if let Some(slot) = slot
            && self.may_fold(&call)
        {
            let body = codec::encode_webhook_reply(&call)?;
            let folded = self
                .bounded(&call.method, signal.as_ref(), slot.try_fold(body))
                .await?;
            match folded {
                Some(Ok(())) => {
                    debug!(method = %call.method, "Folded API call into webhook reply");
                    return Ok(Envelope::success(true));
                }
                // The sink kept nothing, so one network request still follows.
                Some(Err(e)) => warn!(
                    method = %call.method,
                    error = %e,
                    "Webhook reply refused, sending over the network"
                ),
                None => {}
            }
        }
        self.send(call, signal).await
    }

    /// Attachments cannot travel in a JSON webhook reply.
    fn may_fold(&self, call: &MethodCall) -> bool {
        !call.payload.has_files() && (self.config.can_use_webhook_reply)(&call.method)
    }

    async fn send(
        &self,
        call: MethodCall,
        signal: Option<CancellationToken>,
    ) -> CallResult<Envelope> {
        let MethodCall { method, payload } = call;
        let url = (self.url_builder)(&self.config.api_root, &self.token, &method);
        let body = codec::encode(&payload)?;
        debug!(method = %method, multipart = body.is_multipart(), "Sending API request");

        let response = self
            .bounded(
                &method,
                signal.as_ref(),
                self.transport.post(&method, &url, body),
            )
            .await?
            .map_err(|e| self.redact(e))?;
        trace!(
            method = %method,
            status = response.status,
            len = response.body.len(),
            "Received API response"
        );

        match Envelope::from_slice(&method, &response.body) {
            Ok(envelope) => Ok(envelope),
            Err(_) if !response.is_success() => Err(TransportError::Status {
                method,
                status: response.status,
            }
            .into()),
            Err(e) => Err(e.into()),
        }
    }

    /// Races `fut` against the per-call timeout and the caller's abort signal.
    async fn bounded<T>(
        &self,
        method: &str,
        signal: Option<&CancellationToken>,
        fut: impl Future<Output = T>,
    ) -> CallResult<T> {
        let seconds = self.config.timeout_secs;
        let limited = tokio::time::timeout(Duration::from_secs(seconds), fut);
        let outcome = match signal {
            Some(signal) => tokio::select! {
                biased;
                _ = signal.cancelled() => {
                    debug!(method = %method, "API request aborted by caller");
                    return Err(TransportError::Aborted { method: method.to_string() }.into());
                }
                outcome = limited => outcome,
            },
            None => limited.await,
        };
        outcome.map_err(|_| {
            debug!(method = %method, seconds, "API request timed out");
            TransportError::Timeout {
                method: method.to_string(),
                seconds,
            }
            .into()
        })
    }

    fn redact(&self, err: CallError) -> CallError {
        let sensitive = self.config.sensitive_logs;
        match err {
            CallError::Transport(TransportError::Network { method, reason }) => {
                TransportError::Network {
                    method,
                    reason: redact(&reason, &self.token, sensitive),
                }
                .into()
            }
            CallError::Config(ConfigError::InvalidUrl { method, reason }) => {
                ConfigError::InvalidUrl {
                    method,
                    reason: redact(&reason, &self.token, sensitive),
                }
                .into()
            }
            other => other,
        }
    }
}

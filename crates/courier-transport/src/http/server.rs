//! Webhook server.
//!
//! Every update POSTed by the Bot API gets its own [`WebhookReplySlot`] and a
//! per-update [`RawApi`] bound to it. The HTTP response is whichever of these
//! happens first:
//!
//! | Event                                 | Response                          |
//! |---------------------------------------|-----------------------------------|
//! | the handler folds a call into the slot | `200`, the call as JSON           |
//! | the handler finishes                  | empty `200`                       |
//! | the webhook timeout expires           | depends on [`OnTimeout`]          |
//!
//! The handler task is never cancelled; it keeps running after the response
//! has gone out and its later calls use the network.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, error, info, trace, warn};

use courier_core::{RawApi, SlotState, WebhookReplySlot};

/// Header carrying the secret configured with `setWebhook`.
pub const SECRET_TOKEN_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Processes one update with a client bound to that update's reply slot.
pub type UpdateHandler = Arc<dyn Fn(Value, RawApi) -> BoxFuture<'static, ()> + Send + Sync>;

/// Wraps an async closure as an [`UpdateHandler`].
pub fn handler_fn<F, Fut>(f: F) -> UpdateHandler
where
    F: Fn(Value, RawApi) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move |update: Value, api: RawApi| f(update, api).boxed())
}

/// What to answer when the handler outlives the webhook timeout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnTimeout {
    /// Answer `500`; the Bot API will redeliver the update.
    #[default]
    Fail,
    /// Answer an empty `200` and let the handler finish in the background.
    Return,
}

/// Webhook endpoint settings.
#[derive(Debug, Clone)]
pub struct WebhookOptions {
    /// Route the updates are POSTed to.
    pub path: String,
    /// Expected value of [`SECRET_TOKEN_HEADER`]; `None` accepts any request.
    pub secret_token: Option<String>,
    /// How long to wait for a reply before applying `on_timeout`.
    pub timeout: Duration,
    pub on_timeout: OnTimeout,
}

impl Default for WebhookOptions {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
            secret_token: None,
            timeout: Duration::from_secs(10),
            on_timeout: OnTimeout::Fail,
        }
    }
}

impl WebhookOptions {
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_secret_token(mut self, token: impl Into<String>) -> Self {
        self.secret_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_on_timeout(mut self, on_timeout: OnTimeout) -> Self {
        self.on_timeout = on_timeout;
        self
    }
}

/// Errors raised while starting the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

// =============================================================================
// Listener Handle
// =============================================================================

/// Handle to a running webhook server.
///
/// Dropping this handle stops the server.
#[derive(Debug)]
pub struct ListenerHandle {
    /// Address the server is bound to.
    pub local_addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl ListenerHandle {
    /// Stops the server.
    pub fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

// =============================================================================
// Server
// =============================================================================

/// Receives updates and runs a handler for each of them.
pub struct WebhookServer {
    api: RawApi,
    handler: UpdateHandler,
    options: WebhookOptions,
}

impl fmt::Debug for WebhookServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookServer")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

struct ServerState {
    api: RawApi,
    handler: UpdateHandler,
    options: WebhookOptions,
}

impl WebhookServer {
    pub fn new(api: RawApi, handler: UpdateHandler) -> Self {
        Self {
            api,
            handler,
            options: WebhookOptions::default(),
        }
    }

    pub fn with_options(mut self, options: WebhookOptions) -> Self {
        self.options = options;
        self
    }

    /// The webhook route, for mounting into an existing axum application.
    pub fn router(self) -> Router {
        let path = if self.options.path.starts_with('/') {
            self.options.path.clone()
        } else {
            format!("/{}", self.options.path)
        };

        let state = Arc::new(ServerState {
            api: self.api,
            handler: self.handler,
            options: self.options,
        });

        Router::new()
            .route(&path, post(webhook_handler))
            .with_state(state)
    }

    /// Binds `addr` and serves until the returned handle is stopped or
    /// dropped.
    pub async fn listen(self, addr: &str) -> Result<ListenerHandle, ServerError> {
        let bind_err = |source: std::io::Error| ServerError::Bind {
            addr: addr.to_string(),
            source,
        };
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(bind_err)?;
        let local_addr = listener.local_addr().map_err(bind_err)?;

        info!(addr = %local_addr, path = %self.options.path, "Webhook server listening");

        let router = self.router();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let server = axum::serve(listener, router).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
                info!("Webhook server shutting down");
            });
            if let Err(e) = server.await {
                error!(error = %e, "Webhook server error");
            }
        });

        Ok(ListenerHandle {
            local_addr,
            shutdown_tx: Some(shutdown_tx),
        })
    }
}

async fn webhook_handler(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(expected) = &state.options.secret_token {
        let provided = headers
            .get(SECRET_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok());
        if provided != Some(expected.as_str()) {
            warn!("Rejected webhook request with a wrong secret token");
            return (StatusCode::UNAUTHORIZED, "secret token is wrong").into_response();
        }
    }

    let update: Value = match serde_json::from_slice(&body) {
        Ok(update @ Value::Object(_)) => update,
        Ok(_) => {
            warn!("Rejected webhook body that is not a JSON object");
            return (StatusCode::BAD_REQUEST, "update must be a JSON object").into_response();
        }
        Err(e) => {
            warn!(error = %e, "Rejected malformed webhook body");
            return (StatusCode::BAD_REQUEST, "malformed update").into_response();
        }
    };
    let update_id = update.get("update_id").and_then(Value::as_i64);
    trace!(?update_id, len = body.len(), "Received update");

    let (slot, mut reply_rx) = WebhookReplySlot::channel();
    let _close = CloseOnDrop(Arc::clone(&slot));
    let api = state.api.with_webhook_reply(Arc::clone(&slot));
    let mut task = tokio::spawn((state.handler)(update, api));

    let deadline = tokio::time::sleep(state.options.timeout);
    tokio::pin!(deadline);

    tokio::select! {
        biased;

        Ok(body) = &mut reply_rx => {
            debug!(?update_id, "Answering update with a folded call");
            json_reply(body)
        }
        joined = &mut task => {
            if let Err(e) = joined {
                error!(?update_id, error = %e, "Update handler panicked");
            }
            match slot.close() {
                SlotState::Consumed => late_reply(reply_rx).await,
                _ => empty_reply(),
            }
        }
        _ = &mut deadline => {
            if slot.close() == SlotState::Consumed {
                return late_reply(reply_rx).await;
            }
            match state.options.on_timeout {
                OnTimeout::Return => {
                    warn!(?update_id, "Update handler timed out, answering early");
                    empty_reply()
                }
                OnTimeout::Fail => {
                    error!(?update_id, "Update handler timed out");
                    (StatusCode::INTERNAL_SERVER_ERROR, "update handler timed out").into_response()
                }
            }
        }
    }
}

/// Closes the slot however the request ends, including when hyper drops it
/// after the Bot API disconnects. Later calls from the handler then use the
/// network.
struct CloseOnDrop(Arc<WebhookReplySlot>);

impl Drop for CloseOnDrop {
    fn drop(&mut self) {
        if self.0.close() == SlotState::Open {
            trace!("Webhook request ended before the update was answered");
        }
    }
}

/// The slot was claimed but the body had not arrived yet.
async fn late_reply(reply_rx: oneshot::Receiver<Vec<u8>>) -> Response {
    match reply_rx.await {
        Ok(body) => json_reply(body),
        Err(_) => {
            warn!("Folded call was dropped before it reached the response");
            empty_reply()
        }
    }
}

fn json_reply(body: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}

fn empty_reply() -> Response {
    StatusCode::OK.into_response()
}

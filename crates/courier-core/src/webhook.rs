//! Webhook reply folding.
//!
//! While a webhook update is being handled, the Bot API accepts one method
//! call as the body of the HTTP response to that update. A
//! [`WebhookReplySlot`] represents that opportunity for one update:
//!
//! ```text
//! OPEN ──try_fold──▶ CONSUMED ──close──▶ CLOSED
//!   └──────────────────close─────────────────┘
//! ```
//!
//! Claiming the slot is a single compare-and-set, so of several concurrent
//! eligible calls exactly one is folded and the rest go over the network.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::trace;

use crate::methods;

const OPEN: u8 = 0;
const CONSUMED: u8 = 1;
const CLOSED: u8 = 2;

/// Lifecycle state of a [`WebhookReplySlot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// No call folded yet.
    Open,
    /// One call has been folded into the response.
    Consumed,
    /// Update handling is over.
    Closed,
}

impl From<u8> for SlotState {
    fn from(raw: u8) -> Self {
        match raw {
            OPEN => Self::Open,
            CONSUMED => Self::Consumed,
            _ => Self::Closed,
        }
    }
}

/// The reply sink refused the body.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ReplySinkError(pub String);

/// The capability the webhook server lends to the client: write the HTTP
/// response body for the pending update.
///
/// An `Err` must mean nothing was written; the client then sends the call
/// over the network. A slow `send` counts against the call's timeout.
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn send(&self, body: Vec<u8>) -> Result<(), ReplySinkError>;
}

/// [`ReplySink`] handing the body to a oneshot receiver.
pub struct ChannelSink {
    tx: Mutex<Option<oneshot::Sender<Vec<u8>>>>,
}

impl ChannelSink {
    pub fn new(tx: oneshot::Sender<Vec<u8>>) -> Self {
        Self {
            tx: Mutex::new(Some(tx)),
        }
    }
}

#[async_trait]
impl ReplySink for ChannelSink {
    async fn send(&self, body: Vec<u8>) -> Result<(), ReplySinkError> {
        let tx = self
            .tx
            .lock()
            .take()
            .ok_or_else(|| ReplySinkError("reply already sent".into()))?;
        tx.send(body)
            .map_err(|_| ReplySinkError("webhook response already finished".into()))
    }
}

/// At-most-once reply cell for one inbound update.
pub struct WebhookReplySlot {
    state: AtomicU8,
    sink: Box<dyn ReplySink>,
}

impl fmt::Debug for WebhookReplySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookReplySlot")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl WebhookReplySlot {
    /// An open slot writing to `sink`.
    pub fn new(sink: impl ReplySink + 'static) -> Self {
        Self {
            state: AtomicU8::new(OPEN),
            sink: Box::new(sink),
        }
    }

    /// An open slot whose folded body arrives on the returned receiver.
    pub fn channel() -> (Arc<Self>, oneshot::Receiver<Vec<u8>>) {
        let (tx, rx) = oneshot::channel();
        (Arc::new(Self::new(ChannelSink::new(tx))), rx)
    }

    pub fn state(&self) -> SlotState {
        SlotState::from(self.state.load(Ordering::Acquire))
    }

    /// Claims the slot and writes `body` to the sink.
    ///
    /// Returns `None` without touching the sink when the slot is no longer
    /// open; the caller must then use the network.
    pub async fn try_fold(&self, body: Vec<u8>) -> Option<Result<(), ReplySinkError>> {
        self.state
            .compare_exchange(OPEN, CONSUMED, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        trace!(len = body.len(), "Webhook reply slot claimed");
        Some(self.sink.send(body).await)
    }

    /// Marks update handling as finished and returns the previous state.
    ///
    /// A previous state of [`SlotState::Open`] means nothing was folded and
    /// the webhook should answer with an empty acknowledgement.
    pub fn close(&self) -> SlotState {
        SlotState::from(self.state.swap(CLOSED, Ordering::AcqRel))
    }
}

/// Decides per method name whether a call may be folded into a webhook reply.
pub type WebhookReplyPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Never fold.
pub fn never() -> WebhookReplyPredicate {
    Arc::new(|_: &str| false)
}

/// Fold only the listed methods.
pub fn only<I, S>(methods: I) -> WebhookReplyPredicate
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let allowed: Vec<String> = methods.into_iter().map(Into::into).collect();
    Arc::new(move |method: &str| allowed.iter().any(|m| m == method))
}

/// Fold the registry methods whose only possible result is `true`; their
/// callers lose nothing by receiving the synthetic `true`.
pub fn true_returning() -> WebhookReplyPredicate {
    Arc::new(methods::returns_true)
}

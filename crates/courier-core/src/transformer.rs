//! Request/response interceptors around the base API call.
//!
//! A [`Transformer`] receives the outgoing [`MethodCall`] together with the
//! `next` handler and decides what to do with it: pass it on, rewrite it,
//! answer with a synthetic [`Envelope`] without calling `next`, or run code
//! before and after delegating.
//!
//! The installed transformers are folded right-to-left around the base call,
//! so the first transformer added is the outermost layer:
//!
//! ```text
//! call ──▶ A ──▶ B ──▶ base (network or webhook reply)
//!  res ◀── A ◀── B ◀──┘
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::envelope::Envelope;
use crate::error::CallResult;
use crate::payload::MethodCall;

/// A composed API call handler.
///
/// The optional [`CancellationToken`] is the caller's abort signal.
pub type ApiCallFn = Arc<
    dyn Fn(MethodCall, Option<CancellationToken>) -> BoxFuture<'static, CallResult<Envelope>>
        + Send
        + Sync,
>;

/// An interceptor around API calls.
pub trait Transformer: Send + Sync + 'static {
    /// Handles `call`, usually by awaiting `next`.
    fn transform(
        &self,
        call: MethodCall,
        signal: Option<CancellationToken>,
        next: ApiCallFn,
    ) -> BoxFuture<'static, CallResult<Envelope>>;
}

/// Shared transformer handle.
pub type BoxedTransformer = Arc<dyn Transformer>;

/// A [`Transformer`] backed by an async closure. See [`from_fn`].
#[derive(Clone)]
pub struct FnTransformer<F> {
    f: F,
}

/// Creates a transformer from an async closure.
///
/// ```rust,ignore
/// api.use_transformer(from_fn(|mut call, signal, next| async move {
///     call.payload.insert("disable_notification", true);
///     next(call, signal).await
/// }));
/// ```
pub fn from_fn<F, Fut>(f: F) -> FnTransformer<F>
where
    F: Fn(MethodCall, Option<CancellationToken>, ApiCallFn) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CallResult<Envelope>> + Send + 'static,
{
    FnTransformer { f }
}

impl<F, Fut> Transformer for FnTransformer<F>
where
    F: Fn(MethodCall, Option<CancellationToken>, ApiCallFn) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CallResult<Envelope>> + Send + 'static,
{
    fn transform(
        &self,
        call: MethodCall,
        signal: Option<CancellationToken>,
        next: ApiCallFn,
    ) -> BoxFuture<'static, CallResult<Envelope>> {
        (self.f)(call, signal, next).boxed()
    }
}

/// Ordered, append-only transformer sequence.
#[derive(Clone, Default)]
pub struct TransformerChain {
    transformers: Vec<BoxedTransformer>,
}

impl TransformerChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a transformer; it becomes the innermost layer.
    pub fn push(&mut self, transformer: impl Transformer) {
        self.transformers.push(Arc::new(transformer));
    }

    /// Appends an already shared transformer.
    pub fn push_boxed(&mut self, transformer: BoxedTransformer) {
        self.transformers.push(transformer);
    }

    pub fn len(&self) -> usize {
        self.transformers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transformers.is_empty()
    }

    /// Installed transformers, outermost first.
    pub fn iter(&self) -> impl Iterator<Item = &BoxedTransformer> {
        self.transformers.iter()
    }

    /// Wraps `base` in every transformer, first-added outermost.
    pub fn compose(&self, base: ApiCallFn) -> ApiCallFn {
        self.transformers
            .iter()
            .rev()
            .fold(base, |next, transformer| {
                let transformer = Arc::clone(transformer);
                let layer: ApiCallFn =
                    Arc::new(move |call: MethodCall, signal: Option<CancellationToken>| {
                        transformer.transform(call, signal, Arc::clone(&next))
                    });
                layer
            })
    }
}

/// Logs every call with its outcome and latency.
///
/// Install it first to see the final outgoing call and the raw envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceTransformer;

impl Transformer for TraceTransformer {
    fn transform(
        &self,
        call: MethodCall,
        signal: Option<CancellationToken>,
        next: ApiCallFn,
    ) -> BoxFuture<'static, CallResult<Envelope>> {
        async move {
            let method = call.method.clone();
            let args = call.payload.len();
            let started = Instant::now();
            let result = next(call, signal).await;
            let elapsed_ms = started.elapsed().as_millis() as u64;
            match &result {
                Ok(Envelope::Success { .. }) => {
                    debug!(method = %method, args, elapsed_ms, "API call succeeded");
                }
                Ok(Envelope::Failure(failure)) => {
                    debug!(
                        method = %method,
                        elapsed_ms,
                        error_code = failure.error_code,
                        description = %failure.description,
                        "API call rejected"
                    );
                }
                Err(e) => warn!(method = %method, elapsed_ms, error = %e, "API call failed"),
            }
            result
        }
        .boxed()
    }
}

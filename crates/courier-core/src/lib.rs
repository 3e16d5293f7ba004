//! # Courier Core
//!
//! The client core of the Courier Bot API toolkit.
//!
//! This crate owns everything between "the caller invokes a method" and "an
//! HTTP request leaves the process", without depending on any particular
//! HTTP stack:
//!
//! - **URL Builder** ([`url`]): `(root, token, method) → url`
//! - **Payload Codec** ([`payload`], [`codec`], [`envelope`]): arguments to
//!   JSON or multipart bodies, and response envelope parsing
//! - **Transformer Chain** ([`transformer`]): interceptors folded around the
//!   base call
//! - **Webhook Reply Channel** ([`webhook`]): folding one call into the
//!   pending webhook response
//! - **Raw API Dispatcher** ([`RawApi`]): one async method per Bot API
//!   method, timeouts and cancellation
//! - **Error Model** ([`error`]): API errors versus transport errors
//!
//! ## Call Flow
//!
//! ```text
//! RawApi::send_message(payload)
//!   └─▶ MethodCall ─▶ transformer A ─▶ transformer B ─▶ base call
//!                                                      ├─▶ WebhookReplySlot (fold)
//!                                                      └─▶ HttpTransport::post
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use courier_core::{ClientConfig, Payload, RawApi, TraceTransformer};
//! use courier_transport::ReqwestTransport;
//!
//! let api = RawApi::new(token, ClientConfig::default(), ReqwestTransport::new()?);
//! api.use_transformer(TraceTransformer);
//!
//! let me = api.get_me(Payload::new(), None).await?;
//! api.send_message(Payload::new().with("chat_id", 42).with("text", "hi"), None).await?;
//! ```

pub mod client;
pub mod codec;
pub mod config;
pub mod envelope;
pub mod error;
pub mod methods;
pub mod payload;
pub mod transformer;
pub mod transport;
pub mod url;
pub mod webhook;

pub use client::RawApi;
pub use codec::{Part, PartContent, RequestBody};
pub use config::{ClientConfig, DEFAULT_API_ROOT, DEFAULT_TIMEOUT_SECS};
pub use envelope::{Envelope, Failure};
pub use error::{
    ApiError, CallError, CallResult, CodecError, ConfigError, ResponseParameters,
    TransportError, TransportResult,
};
pub use methods::{METHODS, MethodInfo, Returns};
pub use payload::{ByteStream, FileSource, InputFile, MethodCall, Param, Payload};
pub use transformer::{
    ApiCallFn, BoxedTransformer, FnTransformer, TraceTransformer, Transformer, TransformerChain,
    from_fn,
};
pub use transport::{BoxedTransport, HttpResponse, HttpTransport};
pub use url::{Environment, UrlBuilder, build_url, default_url_builder};
pub use webhook::{
    ChannelSink, ReplySink, ReplySinkError, SlotState, WebhookReplyPredicate, WebhookReplySlot,
};

pub use tokio_util::sync::CancellationToken;

/// Prelude for common imports.
pub mod prelude {
    pub use super::{
        CallError, CallResult, CancellationToken, ClientConfig, Envelope, InputFile, MethodCall,
        Payload, RawApi, Transformer, from_fn,
    };
}

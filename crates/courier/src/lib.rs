//! # Courier
//!
//! An async Bot API client for Rust.
//!
//! ## Overview
//!
//! Every Bot API method is an async function on [`RawApi`](prelude::RawApi)
//! that takes structured arguments and returns the unwrapped `result`. Calls
//! pass through a chain of transformers before they reach the wire, and a
//! client handling a webhook update can answer it by folding one call into
//! the HTTP response instead of making a request of its own.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────────────────┐   ┌────────────────────┐
//! │   RawApi    │──▶│ transformer A ─▶ B ─▶ …  │──▶│ webhook reply slot │──▶ HTTP response
//! │ (one method │   │      (onion order)       │   ├────────────────────┤
//! │  per call)  │   └──────────────────────────┘   │   HttpTransport    │──▶ Bot API
//! └─────────────┘                                  └────────────────────┘
//! ```
//!
//! - **Core**: envelopes, payload codec, transformers, reply slot, dispatcher
//! - **Transport**: reqwest client and axum webhook server
//! - **Runtime**: configuration, logging and bootstrap
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use courier::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = CourierRuntime::builder().build()?;
//!     runtime.api().use_transformer(TraceTransformer);
//!
//!     runtime
//!         .run(handler_fn(|update, api| async move {
//!             let chat_id = update["message"]["chat"]["id"].clone();
//!             let _ = api
//!                 .send_message(Payload::new().with("chat_id", chat_id).with("text", "hi"), None)
//!                 .await;
//!         }))
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` (default): load `courier.toml`
//! - `yaml-config`: load `courier.yaml`
//! - `json-log`: JSON log lines

pub use courier_core as core;
pub use courier_runtime as runtime;
pub use courier_transport as transport;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use courier::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use courier_runtime::{CourierConfig, CourierRuntime, LoggingBuilder, RuntimeError};

    // Client
    pub use courier_core::{
        CallError, CallResult, CancellationToken, ClientConfig, Environment, InputFile,
        MethodCall, Payload, RawApi, TraceTransformer, Transformer, from_fn,
    };

    // Transports
    pub use courier_transport::{
        OnTimeout, ReqwestTransport, UpdateHandler, WebhookOptions, WebhookServer, handler_fn,
    };

    // Logging macros
    pub use courier_runtime::prelude::*;
}

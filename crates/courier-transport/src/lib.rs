//! # Courier Transport
//!
//! Concrete HTTP plumbing for the Courier client core.
//!
//! `courier-core` only knows the [`HttpTransport`](courier_core::HttpTransport)
//! trait and the [`WebhookReplySlot`](courier_core::WebhookReplySlot). This
//! crate supplies the pieces that touch the network, behind feature flags:
//!
//! - `http-client`: [`ReqwestTransport`], which posts JSON and multipart
//!   bodies to the Bot API
//! - `http-server`: [`WebhookServer`], an axum endpoint that receives updates
//!   and can answer one of them with a folded method call
//! - `full`: both
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │  courier-core        │  (RawApi, HttpTransport, WebhookReplySlot)
//! ├──────────────────────┤
//! │  courier-transport   │  <- This crate (reqwest / axum)
//! ├──────────────────────┤
//! │  Network (TCP/HTTP)  │
//! └──────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use courier_core::{ClientConfig, RawApi};
//! use courier_transport::{ReqwestTransport, WebhookOptions, WebhookServer, handler_fn};
//!
//! let api = RawApi::new(token, ClientConfig::default(), ReqwestTransport::new()?);
//! let handle = WebhookServer::new(api, handler_fn(|update, api| async move {
//!     // answer the update through `api`
//! }))
//! .with_options(WebhookOptions::default().with_path("/hook"))
//! .listen("0.0.0.0:8443")
//! .await?;
//! ```

// Transport implementations (feature-gated)
#[cfg(any(feature = "http-client", feature = "http-server"))]
pub mod http;

#[cfg(feature = "http-client")]
pub use http::ReqwestTransport;

#[cfg(feature = "http-server")]
pub use http::{
    ListenerHandle, OnTimeout, SECRET_TOKEN_HEADER, ServerError, UpdateHandler, WebhookOptions,
    WebhookServer, handler_fn,
};

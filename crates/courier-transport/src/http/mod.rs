//! HTTP transports.
//!
//! This module provides the Bot API client and the webhook server.

#[cfg(feature = "http-client")]
mod client;
#[cfg(feature = "http-client")]
pub use client::ReqwestTransport;

#[cfg(feature = "http-server")]
mod server;
#[cfg(feature = "http-server")]
pub use server::{
    ListenerHandle, OnTimeout, SECRET_TOKEN_HEADER, ServerError, UpdateHandler, WebhookOptions,
    WebhookServer, handler_fn,
};

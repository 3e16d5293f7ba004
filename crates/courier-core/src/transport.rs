//! The network seam of the client.
//!
//! `courier-core` never opens sockets itself. A concrete [`HttpTransport`]
//! (reqwest in `courier-transport`, a mock in tests) performs the POST and
//! hands back the raw status and body; envelope parsing, timeouts and
//! cancellation stay in the dispatcher.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::codec::RequestBody;
use crate::error::CallResult;

/// Raw HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one POST request.
///
/// Implementations report unusable URLs as [`ConfigError`](crate::ConfigError)
/// and connection or body failures as
/// [`TransportError::Network`](crate::TransportError::Network). Dropping the
/// returned future must abort the request.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn post(&self, method: &str, url: &str, body: RequestBody) -> CallResult<HttpResponse>;
}

#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    async fn post(&self, method: &str, url: &str, body: RequestBody) -> CallResult<HttpResponse> {
        (**self).post(method, url, body).await
    }
}

/// Shared transport handle.
pub type BoxedTransport = Arc<dyn HttpTransport>;

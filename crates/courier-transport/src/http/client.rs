//! reqwest implementation of [`HttpTransport`].

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part as FormPart};
use reqwest::{Body, Client, ClientBuilder, Url};
use tokio_util::io::ReaderStream;
use tracing::trace;

use courier_core::{
    CallResult, ConfigError, FileSource, HttpResponse, HttpTransport, InputFile, Part,
    PartContent, RequestBody, TransportError,
};

/// Bot API transport backed by a shared [`reqwest::Client`].
///
/// The client carries no request timeout of its own; the dispatcher bounds
/// every call and drops the request future when the limit is hit.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with a default client.
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_builder(ClientBuilder::new())
    }

    /// Creates a transport from a customised builder (proxies, TLS, ...).
    pub fn from_builder(builder: ClientBuilder) -> Result<Self, ConfigError> {
        let client = builder
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wraps an existing client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post(&self, method: &str, url: &str, body: RequestBody) -> CallResult<HttpResponse> {
        let url = Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
            method: method.to_string(),
            reason: format!("{e}: {url}"),
        })?;

        let request = match body {
            RequestBody::Json(bytes) => {
                trace!(method, len = bytes.len(), "Posting JSON body");
                self.client
                    .post(url)
                    .header(CONTENT_TYPE, "application/json")
                    .body(bytes)
            }
            RequestBody::Multipart(parts) => {
                trace!(method, parts = parts.len(), "Posting multipart body");
                self.client.post(url).multipart(build_form(method, parts).await?)
            }
        };

        let response = request.send().await.map_err(|e| network(method, e))?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| network(method, e))?;
        trace!(method, status, len = body.len(), "Received response");

        Ok(HttpResponse::new(status, body))
    }
}

async fn build_form(method: &str, parts: Vec<Part>) -> CallResult<Form> {
    let mut form = Form::new();
    for Part { name, content } in parts {
        form = match content {
            PartContent::Text(text) => form.text(name, text),
            PartContent::File(file) => {
                let part = file_part(method, &name, file).await?;
                form.part(name, part)
            }
        };
    }
    Ok(form)
}

async fn file_part(method: &str, name: &str, file: InputFile) -> CallResult<FormPart> {
    let body = match &file.source {
        FileSource::Bytes(bytes) => Body::from(bytes.clone()),
        FileSource::Path(path) => {
            let handle = tokio::fs::File::open(path)
                .await
                .map_err(|e| network(method, format!("cannot open {}: {e}", path.display())))?;
            Body::wrap_stream(ReaderStream::new(handle))
        }
        FileSource::Stream(_) => {
            let stream = file
                .take_stream()
                .ok_or_else(|| network(method, format!("stream for '{name}' was already consumed")))?;
            Body::wrap_stream(stream)
        }
    };

    let filename = file.filename.unwrap_or_else(|| name.to_string());
    Ok(FormPart::stream(body).file_name(filename))
}

fn network(method: &str, reason: impl std::fmt::Display) -> courier_core::CallError {
    TransportError::Network {
        method: method.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

//! A mock Bot API served by axum on an ephemeral port.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    Router,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use courier_core::{ClientConfig, RawApi};
use courier_transport::ReqwestTransport;
use serde_json::json;

pub const TOKEN: &str = "123456:TEST-token";

/// One request received by the mock.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl Recorded {
    pub fn method(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or_default()
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

pub struct MockBotApi {
    pub addr: SocketAddr,
    pub requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockBotApi {
    pub fn root(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    /// A client pointed at this mock.
    pub fn client(&self, config: ClientConfig) -> RawApi {
        RawApi::new(
            TOKEN,
            config.with_api_root(self.root()),
            ReqwestTransport::new().unwrap(),
        )
    }
}

pub async fn spawn_bot_api() -> MockBotApi {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let router = Router::new()
        .route("/{*rest}", post(respond))
        .with_state(Arc::clone(&requests));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    MockBotApi { addr, requests }
}

async fn respond(
    State(requests): State<Arc<Mutex<Vec<Recorded>>>>,
    Path(rest): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let recorded = Recorded {
        path: format!("/{rest}"),
        content_type,
        body: body.to_vec(),
    };
    let method = recorded.method().to_string();
    requests.lock().unwrap().push(recorded);

    match method.as_str() {
        "getMe" => axum::Json(json!({
            "ok": true,
            "result": { "id": 1, "is_bot": true, "first_name": "Courier" }
        }))
        .into_response(),
        "sendMessage" => axum::Json(json!({
            "ok": true,
            "result": { "message_id": 99, "chat": { "id": 42 } }
        }))
        .into_response(),
        "failing" => (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: chat not found"
            })),
        )
            .into_response(),
        "flooding" => (
            StatusCode::TOO_MANY_REQUESTS,
            axum::Json(json!({
                "ok": false,
                "error_code": 429,
                "description": "Too Many Requests: retry after 3",
                "parameters": { "retry_after": 3 }
            })),
        )
            .into_response(),
        "broken" => (StatusCode::BAD_GATEWAY, "Bad Gateway").into_response(),
        _ => axum::Json(json!({ "ok": true, "result": true })).into_response(),
    }
}

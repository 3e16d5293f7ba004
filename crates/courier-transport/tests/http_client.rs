//! End-to-end calls through `ReqwestTransport` against a mock Bot API.

mod common;

use bytes::Bytes;
use common::{TOKEN, spawn_bot_api};
use courier_core::{CallError, ClientConfig, Environment, InputFile, Payload, TransportError};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};

#[tokio::test]
async fn test_get_me_posts_json() {
    let mock = spawn_bot_api().await;
    let api = mock.client(ClientConfig::default());

    let me = assert_ok!(api.get_me(Payload::new(), None).await);
    assert_eq!(me["first_name"], "Courier");

    let recorded = mock.recorded();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].path, format!("/bot{TOKEN}/getMe"));
    assert_eq!(recorded[0].content_type, "application/json");
    assert_eq!(recorded[0].body_text(), "{}");
}

#[tokio::test]
async fn test_nulls_are_not_sent() {
    let mock = spawn_bot_api().await;
    let api = mock.client(ClientConfig::default());

    let payload = Payload::new()
        .with("chat_id", 42)
        .with("text", "hi")
        .with("parse_mode", serde_json::Value::Null);
    let message = assert_ok!(api.send_message(payload, None).await);
    assert_eq!(message["message_id"], 99);

    let body: serde_json::Value = serde_json::from_slice(&mock.recorded()[0].body).unwrap();
    assert_eq!(body, json!({ "chat_id": 42, "text": "hi" }));
}

#[tokio::test]
async fn test_test_environment_url() {
    let mock = spawn_bot_api().await;
    let api = mock.client(ClientConfig::default().with_environment(Environment::Test));

    assert_ok!(api.get_me(Payload::new(), None).await);
    assert_eq!(mock.recorded()[0].path, format!("/bot{TOKEN}/test/getMe"));
}

#[tokio::test]
async fn test_bytes_upload_is_multipart() {
    let mock = spawn_bot_api().await;
    let api = mock.client(ClientConfig::default());

    let payload = Payload::new()
        .with("chat_id", 42)
        .with("reply_markup", json!({ "remove_keyboard": true }))
        .with_file(
            "document",
            InputFile::bytes(Bytes::from_static(b"hello file")).with_filename("report.txt"),
        );
    assert_ok!(api.send_document(payload, None).await);

    let recorded = &mock.recorded()[0];
    assert!(recorded.content_type.starts_with("multipart/form-data"));
    let body = recorded.body_text();
    assert!(body.contains(r#"name="chat_id""#));
    assert!(body.contains("\r\n42\r\n"));
    assert!(body.contains(r#"{"remove_keyboard":true}"#));
    assert!(body.contains(r#"filename="report.txt""#));
    assert!(body.contains("hello file"));
}

#[tokio::test]
async fn test_path_and_stream_uploads() {
    let mock = spawn_bot_api().await;
    let api = mock.client(ClientConfig::default());

    let path = std::env::temp_dir().join(format!("courier-upload-{}.txt", std::process::id()));
    std::fs::write(&path, b"from disk").unwrap();

    let chunks: Vec<std::io::Result<Bytes>> = vec![
        Ok(Bytes::from_static(b"streamed ")),
        Ok(Bytes::from_static(b"content")),
    ];
    let mut payload = Payload::new().with_file("document", InputFile::path(&path));
    let reference = payload.attach(
        InputFile::stream(Box::pin(futures::stream::iter(chunks))).with_filename("thumb.jpg"),
    );
    payload.insert("thumbnail", reference);

    let result = api.send_document(payload, None).await;
    std::fs::remove_file(&path).ok();
    assert_ok!(result);

    let body = mock.recorded()[0].body_text();
    assert!(body.contains("from disk"));
    assert!(body.contains("streamed content"));
    assert!(body.contains(r#"name="attachment0""#));
    assert!(body.contains("attach://attachment0"));
}

#[tokio::test]
async fn test_api_error() {
    let mock = spawn_bot_api().await;
    let api = mock.client(ClientConfig::default());

    let err = assert_err!(api.call("failing", Payload::new(), None).await);
    let api_err = err.as_api().unwrap();
    assert_eq!(api_err.method, "failing");
    assert_eq!(api_err.error_code, 400);
    assert_eq!(api_err.description, "Bad Request: chat not found");
}

#[tokio::test]
async fn test_api_error_parameters() {
    let mock = spawn_bot_api().await;
    let api = mock.client(ClientConfig::default());

    let err = assert_err!(api.call("flooding", Payload::new(), None).await);
    assert_eq!(err.as_api().unwrap().parameters.retry_after, Some(3));
}

#[tokio::test]
async fn test_non_envelope_status() {
    let mock = spawn_bot_api().await;
    let api = mock.client(ClientConfig::default());

    let err = assert_err!(api.call("broken", Payload::new(), None).await);
    assert!(matches!(
        err,
        CallError::Transport(TransportError::Status { status: 502, .. })
    ));
}

#[tokio::test]
async fn test_connection_refused_redacts_token() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let root = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let api = courier_core::RawApi::new(
        TOKEN,
        ClientConfig::default().with_api_root(root),
        courier_transport::ReqwestTransport::new().unwrap(),
    );

    let err = assert_err!(api.get_me(Payload::new(), None).await);
    let message = err.to_string();
    assert!(message.starts_with("Network request for 'getMe' failed!"));
    assert!(!message.contains(TOKEN));
}

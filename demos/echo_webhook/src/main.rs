//! Echo Webhook Example
//!
//! Serves a webhook and answers every text message by echoing it back. The
//! echo is folded into the webhook response, so it costs no extra request;
//! anything sent after it goes over the network as usual.
//!
//! # Usage
//!
//! ```bash
//! COURIER_BOT__TOKEN=123:abc cargo run --package echo-webhook -- \
//!     --port 8443 --register https://bot.example.com/hook --path /hook
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use courier::prelude::*;
use courier::runtime::ConfigLoader;
use courier::runtime::config::WebhookSection;
use serde_json::Value;

#[derive(Debug, Parser)]
#[command(about = "Echo bot served over a webhook")]
struct Args {
    /// Configuration file (defaults to ./courier.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Port to listen on, overriding the configuration.
    #[arg(long)]
    port: Option<u16>,

    /// Webhook path, overriding the configuration.
    #[arg(long)]
    path: Option<String>,

    /// Public URL to register with `setWebhook` before serving.
    #[arg(long)]
    register: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Echoes the text of a message update.
async fn echo(update: Value, api: RawApi) {
    let message = &update["message"];
    let (Some(chat_id), Some(text)) = (message["chat"]["id"].as_i64(), message["text"].as_str())
    else {
        return;
    };

    if text.trim() == "/start" {
        let typing = Payload::new()
            .with("chat_id", chat_id)
            .with("action", "typing");
        if let Err(e) = api.send_chat_action(typing, None).await {
            error!(error = %e, "Failed to send chat action");
        }
    }

    let reply = Payload::new()
        .with("chat_id", chat_id)
        .with("text", text)
        .with("reply_parameters", serde_json::json!({ "message_id": message["message_id"] }));
    match api.send_message(reply, None).await {
        Ok(result) => debug!(%result, "Echo sent"),
        Err(e) => error!(error = %e, "Failed to send echo"),
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut loader = ConfigLoader::new().with_current_dir();
    if let Some(path) = &args.config {
        loader = loader.file(path);
    }
    let mut config = loader.load()?;
    apply_overrides(&mut config.webhook, &args);
    if config.client.webhook_reply_methods.is_empty() {
        config.client.webhook_reply_methods = vec!["sendMessage".to_string(), "*true".to_string()];
    }
    let runtime = CourierRuntime::from_config(config)?;

    runtime.api().use_transformer(TraceTransformer);

    if let Some(url) = &args.register {
        runtime.register_webhook(url).await?;
        info!(url = %url, "Webhook registered");
    }

    runtime.run(handler_fn(echo)).await?;
    Ok(())
}

fn apply_overrides(webhook: &mut WebhookSection, args: &Args) {
    if let Some(port) = args.port {
        webhook.port = port;
    }
    if let Some(path) = &args.path {
        webhook.path.clone_from(path);
    }
}

//! Configuration module for the Courier runtime.
//!
//! This module provides layered configuration loading (built-in defaults,
//! files, `COURIER_*` environment variables) and validation for the bot
//! client, the webhook endpoint and logging.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    BotSection, ClientSection, CourierConfig, LogFormat, LogLevel, LogOutput, LogRotation,
    LoggingConfig, SpanEventConfig, TRUE_RETURNING, WebhookSection,
};
pub use validation::validate_config;

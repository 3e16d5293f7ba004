//! Runtime error types.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while bootstrapping or running a bot.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Loading or validating the configuration failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP client could not be built.
    #[error("Failed to build Bot API client: {0}")]
    Client(#[from] courier_core::ConfigError),

    /// The webhook server could not start.
    #[error("Failed to start webhook server: {0}")]
    Server(#[from] courier_transport::ServerError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

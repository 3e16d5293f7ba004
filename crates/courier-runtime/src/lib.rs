//! Courier Runtime - bootstrap layer for Courier bots.
//!
//! This crate provides:
//! - Layered configuration (`CourierConfig`, `ConfigLoader`, `validate_config`)
//! - Logging setup (`LoggingBuilder`, `init_from_config`)
//! - A runtime that builds the Bot API client from configuration and serves
//!   the webhook (`CourierRuntime`)
//!
//! ```ignore
//! use courier_runtime::CourierRuntime;
//! use courier_transport::handler_fn;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Loads courier.toml and COURIER_* variables, then sets up logging
//!     let runtime = CourierRuntime::builder().build()?;
//!
//!     runtime
//!         .run(handler_fn(|update, api| async move {
//!             let _ = (update, api);
//!         }))
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

// Re-exports
pub use config::{ConfigError, ConfigLoader, ConfigResult, CourierConfig, validate_config};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents, init_from_config};
pub use runtime::{CourierRuntime, RuntimeBuilder};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}

//! Unified error types for the Courier client.
//!
//! Callers routinely branch on "did the Bot API reject the call" versus
//! "could we not reach it at all", so the two never share a type:
//!
//! | Type | Raised when |
//! |------|-------------|
//! | [`ApiError`] | the envelope came back with `ok: false` |
//! | [`TransportError`] | network failure, unparseable body, timeout, abort |
//! | [`ConfigError`] | the client setup is unusable (detected at first use) |
//!
//! All of them surface through [`CallError`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

// =============================================================================
// API Errors
// =============================================================================

/// Extra information the Bot API attaches to some failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseParameters {
    /// The group has been migrated to a supergroup with this identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migrate_to_chat_id: Option<i64>,
    /// Seconds left to wait before the request can be repeated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

/// The Bot API understood the request and rejected it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Call to '{method}' failed! ({error_code}: {description})")]
pub struct ApiError {
    /// Method the caller invoked.
    pub method: String,
    /// Numeric error code from the envelope.
    pub error_code: i64,
    /// Human-readable description from the envelope.
    pub description: String,
    /// Structured `parameters` object, if the envelope had one.
    pub parameters: ResponseParameters,
    /// Any other fields the envelope carried.
    pub extra: Map<String, Value>,
}

// =============================================================================
// Transport Errors
// =============================================================================

/// The call could not be completed over the wire.
///
/// HTTP is at-most-once: none of these variants say whether the Bot API
/// received the request before the failure.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The request could not be sent or its response could not be read.
    #[error("Network request for '{method}' failed! ({reason})")]
    Network {
        /// Method being called.
        method: String,
        /// Underlying failure, with the token redacted unless sensitive
        /// logging is enabled.
        reason: String,
    },

    /// A non-2xx status whose body is not an envelope.
    #[error("Network request for '{method}' failed! (HTTP {status})")]
    Status {
        /// Method being called.
        method: String,
        /// HTTP status code.
        status: u16,
    },

    /// The response body is not a valid envelope.
    #[error("Failed to parse response for '{method}': {reason}")]
    Parse {
        /// Method being called.
        method: String,
        /// What was wrong with the body.
        reason: String,
    },

    /// The per-call timeout expired.
    #[error("Request to '{method}' timed out after {seconds} seconds")]
    Timeout {
        /// Method being called.
        method: String,
        /// Configured timeout.
        seconds: u64,
    },

    /// The caller's abort signal fired.
    #[error("Request to '{method}' was aborted")]
    Aborted {
        /// Method being called.
        method: String,
    },
}

impl TransportError {
    /// Name of the method the failure belongs to.
    pub fn method(&self) -> &str {
        match self {
            Self::Network { method, .. }
            | Self::Status { method, .. }
            | Self::Parse { method, .. }
            | Self::Timeout { method, .. }
            | Self::Aborted { method } => method,
        }
    }

    /// Whether this failure was caused by the client-side timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// The client configuration cannot be used to reach the Bot API.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// The URL produced by the URL builder is not a valid request URL.
    #[error("invalid request URL for '{method}': {reason}")]
    InvalidUrl {
        /// Method being called.
        method: String,
        /// Why the URL was rejected.
        reason: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

// =============================================================================
// Codec Errors
// =============================================================================

/// Arguments could not be turned into a request body.
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    /// Typed arguments did not serialize to a JSON object.
    #[error("arguments must serialize to a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// `serde_json` failed.
    #[error("serialization error: {0}")]
    Json(String),

    /// The `result` did not match the requested type.
    #[error("unexpected result for '{method}': {reason}")]
    Result {
        /// Method being called.
        method: String,
        /// Deserialization failure.
        reason: String,
    },
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

// =============================================================================
// Call Errors
// =============================================================================

/// Everything a dispatcher call can fail with.
#[derive(Debug, Clone, Error)]
pub enum CallError {
    /// `ok: false` envelope.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// Network, parse, timeout or abort failure.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// Unusable client setup.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Arguments or result could not be (de)serialized.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// A transformer rejected the call.
    #[error("transformer rejected '{method}': {reason}")]
    Transformer {
        /// Method being called.
        method: String,
        /// Reason given by the transformer.
        reason: String,
    },
}

impl CallError {
    /// Builds a [`CallError::Transformer`].
    pub fn transformer(method: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::Transformer {
            method: method.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns the API error if the Bot API rejected the call.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the transport error if the Bot API could not be reached.
    pub fn as_transport(&self) -> Option<&TransportError> {
        match self {
            Self::Transport(err) => Some(err),
            _ => None,
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for dispatcher calls.
pub type CallResult<T> = Result<T, CallError>;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Replaces every occurrence of `token` in `text` unless `sensitive` is set.
pub fn redact(text: &str, token: &str, sensitive: bool) -> String {
    if sensitive || token.is_empty() {
        text.to_string()
    } else {
        text.replace(token, "[REDACTED]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_message() {
        let err = ApiError {
            method: "getMe".into(),
            error_code: 42,
            description: "evil".into(),
            parameters: ResponseParameters::default(),
            extra: Map::new(),
        };
        assert_eq!(err.to_string(), "Call to 'getMe' failed! (42: evil)");

        let wrapped = CallError::from(err);
        assert_eq!(wrapped.to_string(), "Call to 'getMe' failed! (42: evil)");
        assert!(wrapped.as_api().is_some());
        assert!(wrapped.as_transport().is_none());
    }

    #[test]
    fn test_timeout_message() {
        let err = TransportError::Timeout {
            method: "sendMessage".into(),
            seconds: 3,
        };
        assert!(err.is_timeout());
        assert_eq!(err.method(), "sendMessage");
        assert_eq!(
            err.to_string(),
            "Request to 'sendMessage' timed out after 3 seconds"
        );
    }

    #[test]
    fn test_redact() {
        let reason = "error sending request for url (https://x/botTOKEN/getMe)";
        assert_eq!(
            redact(reason, "TOKEN", false),
            "error sending request for url (https://x/bot[REDACTED]/getMe)"
        );
        assert_eq!(redact(reason, "TOKEN", true), reason);
    }
}

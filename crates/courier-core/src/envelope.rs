//! The Bot API response envelope.
//!
//! Every response body is one of:
//!
//! ```text
//! { "ok": true,  "result": <T> }
//! { "ok": false, "error_code": <int>, "description": <string>, "parameters"?: {...}, ... }
//! ```

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{ApiError, ResponseParameters, TransportError};

/// Failure half of an [`Envelope`].
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub error_code: i64,
    pub description: String,
    pub parameters: ResponseParameters,
    /// Fields not covered above.
    pub extra: Map<String, Value>,
}

impl Failure {
    /// Creates a failure with no parameters.
    pub fn new(error_code: i64, description: impl Into<String>) -> Self {
        Self {
            error_code,
            description: description.into(),
            parameters: ResponseParameters::default(),
            extra: Map::new(),
        }
    }

    /// Attaches this failure to `method`.
    pub fn into_error(self, method: impl Into<String>) -> ApiError {
        ApiError {
            method: method.into(),
            error_code: self.error_code,
            description: self.description,
            parameters: self.parameters,
            extra: self.extra,
        }
    }
}

/// A parsed response envelope with an untyped `result`.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Success { result: Value },
    Failure(Failure),
}

#[derive(Deserialize)]
struct WireEnvelope {
    ok: bool,
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    parameters: Option<ResponseParameters>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Envelope {
    /// Successful envelope carrying `result`.
    pub fn success(result: impl Into<Value>) -> Self {
        Self::Success {
            result: result.into(),
        }
    }

    /// Failed envelope.
    pub fn failure(error_code: i64, description: impl Into<String>) -> Self {
        Self::Failure(Failure::new(error_code, description))
    }

    /// Whether the envelope has `ok: true`.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Parses a response body received for `method`.
    pub fn from_slice(method: &str, body: &[u8]) -> Result<Self, TransportError> {
        let wire: WireEnvelope =
            serde_json::from_slice(body).map_err(|e| TransportError::Parse {
                method: method.to_string(),
                reason: e.to_string(),
            })?;

        if wire.ok {
            return Ok(Self::Success {
                result: wire.result,
            });
        }

        let Some(error_code) = wire.error_code else {
            return Err(TransportError::Parse {
                method: method.to_string(),
                reason: "failure envelope without error_code".to_string(),
            });
        };
        let mut extra = wire.extra;
        if !wire.result.is_null() {
            extra.insert("result".into(), wire.result);
        }
        Ok(Self::Failure(Failure {
            error_code,
            description: wire.description.unwrap_or_default(),
            parameters: wire.parameters.unwrap_or_default(),
            extra,
        }))
    }

    /// Unwraps the result, turning a failure into an [`ApiError`] for `method`.
    pub fn into_result(self, method: &str) -> Result<Value, ApiError> {
        match self {
            Self::Success { result } => Ok(result),
            Self::Failure(failure) => Err(failure.into_error(method)),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_success() {
        let body = br#"{"ok":true,"result":{"testValue":0}}"#;
        let envelope = Envelope::from_slice("getMe", body).unwrap();
        assert_eq!(envelope, Envelope::success(json!({"testValue": 0})));
    }

    #[test]
    fn test_parse_success_without_result() {
        let envelope = Envelope::from_slice("close", br#"{"ok":true}"#).unwrap();
        assert_eq!(envelope.into_result("close").unwrap(), Value::Null);
    }

    #[test]
    fn test_parse_failure_with_parameters() {
        let body = br#"{"ok":false,"error_code":429,"description":"Too Many Requests",
            "parameters":{"retry_after":7},"hint":"slow down"}"#;
        let Envelope::Failure(failure) = Envelope::from_slice("sendMessage", body).unwrap() else {
            panic!("expected failure");
        };
        assert_eq!(failure.error_code, 429);
        assert_eq!(failure.parameters.retry_after, Some(7));
        assert_eq!(failure.extra.get("hint"), Some(&json!("slow down")));

        let err = failure.into_error("sendMessage");
        assert_eq!(
            err.to_string(),
            "Call to 'sendMessage' failed! (429: Too Many Requests)"
        );
    }

    #[test]
    fn test_missing_ok_is_parse_error() {
        let err = Envelope::from_slice("getMe", br#"{"result":1}"#).unwrap_err();
        assert!(matches!(err, TransportError::Parse { ref method, .. } if method == "getMe"));
    }

    #[test]
    fn test_failure_without_error_code_is_parse_error() {
        let err = Envelope::from_slice("sendMessage", br#"{"ok":false}"#).unwrap_err();
        assert!(matches!(err, TransportError::Parse { ref method, .. } if method == "sendMessage"));

        let body = br#"{"ok":false,"error_code":500}"#;
        let Envelope::Failure(failure) = Envelope::from_slice("sendMessage", body).unwrap() else {
            panic!("expected failure");
        };
        assert_eq!(failure.description, "");
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = Envelope::from_slice("getMe", b"<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, TransportError::Parse { .. }));
    }
}

//! Request URL construction.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Maps `(api_root, token, method)` to the request URL.
///
/// Injectable so tests and local Bot API servers can choose their own URL
/// shape. A malformed result is only detected when the transport first
/// tries to use it.
pub type UrlBuilder = Arc<dyn Fn(&str, &str, &str) -> String + Send + Sync>;

/// Which Bot API environment the default URL builder targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Prod,
    Test,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prod => f.write_str("prod"),
            Self::Test => f.write_str("test"),
        }
    }
}

/// `{root}/bot{token}/{method}`, or `{root}/bot{token}/test/{method}` for the
/// test environment.
pub fn build_url(root: &str, token: &str, method: &str, env: Environment) -> String {
    let root = root.trim_end_matches('/');
    match env {
        Environment::Prod => format!("{root}/bot{token}/{method}"),
        Environment::Test => format!("{root}/bot{token}/test/{method}"),
    }
}

/// The default [`UrlBuilder`] for `env`.
pub fn default_url_builder(env: Environment) -> UrlBuilder {
    Arc::new(move |root: &str, token: &str, method: &str| build_url(root, token, method, env))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prod_url() {
        let build = default_url_builder(Environment::Prod);
        assert_eq!(
            build("https://api.telegram.org", "123:abc", "getMe"),
            "https://api.telegram.org/bot123:abc/getMe"
        );
    }

    #[test]
    fn test_test_environment_url() {
        assert_eq!(
            build_url("http://localhost:8081/", "t", "sendMessage", Environment::Test),
            "http://localhost:8081/bott/test/sendMessage"
        );
    }
}

//! Shared helpers for talking to the vendor API: HTTP status mapping, API key
//! resolution, and (behind `transport-reqwest`) the default HTTP client.

use crate::error::{Result, ScopeError};
use crate::traits::TransportResponse;

#[cfg(feature = "transport-reqwest")]
pub mod http;

#[cfg(feature = "transport-reqwest")]
pub use http::HttpTransport;

/// Map a non-2xx response to a [`ScopeError`]. Returns the response unchanged
/// when the status is 2xx.
pub fn check_status(api: &str, response: TransportResponse) -> Result<TransportResponse> {
    if response.is_success() {
        return Ok(response);
    }
    let message = response
        .body
        .as_ref()
        .and_then(|body| body.get("message"))
        .and_then(|m| m.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{} API error", api));
    Err(match response.status {
        429 => ScopeError::TransientTransport(format!("{} rate limited: {}", api, message)),
        401 | 403 => ScopeError::Unauthorized,
        500..=599 => ScopeError::TransientTransport(format!(
            "{} unavailable ({}): {}",
            api, response.status, message
        )),
        status => ScopeError::Api { status, message },
    })
}

/// Read the API key from the environment variable `env_var`.
pub fn resolve_api_key(env_var: &str) -> Result<String> {
    std::env::var(env_var)
        .ok()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| ScopeError::Config(format!("{} env var not set", env_var)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: u16) -> TransportResponse {
        TransportResponse {
            status,
            body: Some(json!({"code": "X", "message": "boom"})),
        }
    }

    #[test]
    fn status_mapping() {
        assert!(check_status("video", response(200)).is_ok());
        assert!(matches!(
            check_status("video", response(429)),
            Err(ScopeError::TransientTransport(_))
        ));
        assert!(matches!(
            check_status("video", response(503)),
            Err(ScopeError::TransientTransport(_))
        ));
        assert!(matches!(
            check_status("video", response(401)),
            Err(ScopeError::Unauthorized)
        ));
        match check_status("video", response(400)) {
            Err(ScopeError::Api { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn status_mapping_without_body() {
        let err = check_status(
            "video",
            TransportResponse {
                status: 404,
                body: None,
            },
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "API error (404): video API error");
        assert!(!err.is_retryable());
    }

    #[test]
    fn missing_api_key_is_config_error() {
        assert!(matches!(
            resolve_api_key("SCOPEKIT_TEST_KEY_THAT_IS_NEVER_SET"),
            Err(ScopeError::Config(_))
        ));
    }
}

//! Remote entity client contract.
//!
//! A gateway call performs exactly one remote invocation and yields a
//! [`RemoteResponse`]: status code plus optional typed body. A non-2xx
//! result is a normal, inspectable outcome rather than an `Err`. Only failures
//! to reach or understand the remote side (connect, timeout, deserializing
//! a success body) surface as [`TransportError`], so workflows can tell a
//! dependency that answered "no" apart from one that never answered.
//!
//! Retries are deliberately absent at this layer; whether to retry is the
//! calling workflow's decision.

use crate::dto::ErrorBody;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Failure to reach a remote dependency or to understand its answer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection or protocol-level failure
    #[error("request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The remote answered success but the body did not match the contract
    /// type
    #[error("response deserialization failed: {0}")]
    Deserialize(String),
}

/// Required configuration that was not provided.
#[derive(Debug, Error)]
#[error("missing configuration: {0}")]
pub struct MissingConfig(pub &'static str);

/// Outcome of one remote invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteResponse<T> {
    /// HTTP status code
    pub status: u16,
    /// Typed body, when the call succeeded and the body was non-empty
    pub body: Option<T>,
    /// Best-effort error details extracted from a non-2xx body
    pub details: Option<String>,
}

impl<T> RemoteResponse<T> {
    /// True for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Builds a [`RemoteResponse`] from a success status and raw body text.
///
/// An empty body maps to `body: None`, which the workflows treat as a
/// contract violation by the dependency.
///
/// # Errors
///
/// Returns [`TransportError::Deserialize`] when a non-empty success body
/// does not parse as `T`.
pub fn success_response<T: DeserializeOwned>(
    status: u16,
    text: &str,
) -> Result<RemoteResponse<T>, TransportError> {
    if text.trim().is_empty() {
        return Ok(RemoteResponse {
            status,
            body: None,
            details: None,
        });
    }

    let body = serde_json::from_str(text).map_err(|e| TransportError::Deserialize(e.to_string()))?;
    Ok(RemoteResponse {
        status,
        body: Some(body),
        details: None,
    })
}

/// Builds a [`RemoteResponse`] for a non-2xx status, extracting details
/// from the error body: the `message` field when the body parses as the
/// standard error shape, the raw text otherwise, nothing when empty.
#[must_use]
pub fn failure_response<T>(status: u16, text: &str) -> RemoteResponse<T> {
    let details = match serde_json::from_str::<ErrorBody>(text) {
        Ok(body) => Some(body.message),
        Err(_) if !text.trim().is_empty() => Some(text.to_string()),
        Err(_) => None,
    };

    RemoteResponse {
        status,
        body: None,
        details,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::dto::GetAccount;

    #[test]
    fn empty_success_body_is_none_not_error() {
        let response = success_response::<GetAccount>(200, "  ").unwrap();
        assert!(response.is_success());
        assert!(response.body.is_none());
    }

    #[test]
    fn malformed_success_body_is_a_transport_error() {
        let result = success_response::<GetAccount>(200, "{not json");
        assert!(matches!(result, Err(TransportError::Deserialize(_))));
    }

    #[test]
    fn failure_extracts_message_field() {
        let response = failure_response::<GetAccount>(422, r#"{"message":"balance too low"}"#);
        assert!(!response.is_success());
        assert_eq!(response.details.as_deref(), Some("balance too low"));
    }

    #[test]
    fn failure_falls_back_to_raw_text_then_nothing() {
        let raw = failure_response::<GetAccount>(500, "boom");
        assert_eq!(raw.details.as_deref(), Some("boom"));

        let empty = failure_response::<GetAccount>(500, "");
        assert_eq!(empty.details, None);
    }
}

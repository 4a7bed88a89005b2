//! Error types for the API client.
//!
//! # Design
//! Only `Timeout` is recovered locally (by retrying). Every other variant
//! surfaces to the caller of the top-level call unchanged. `Http` renders as
//! `<code>:<body>` so callers that only keep the message still see both.

use thiserror::Error;

use crate::transport::TransportError;

/// Errors returned by `ApiClient` calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered 408/504 or the transport timed out.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The server returned a status outside 200..=299.
    #[error("{status}:{body}")]
    Http { status: u16, body: String },

    /// A 2xx response that actually encodes an application-level failure,
    /// raised by `ApiHooks::check_for_special_response_errors`.
    #[error("application error: {0}")]
    Application(String),

    /// The request never produced a response (refused connection, TLS
    /// verification failure, unreadable trust store).
    #[error("transport failed: {0}")]
    Transport(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// The retry loop ran past its bound. Indicates a logic defect.
    #[error("retry attempt {attempt} exceeds the bound of {max_retries} retries")]
    RetryInvariant { attempt: u32, max_retries: u32 },
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout(msg) => ApiError::Timeout(msg),
            other => ApiError::Transport(other.to_string()),
        }
    }
}

impl ApiError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_message_is_code_and_body() {
        let err = ApiError::Http {
            status: 500,
            body: "oops".to_string(),
        };
        assert_eq!(err.to_string(), "500:oops");
    }

    #[test]
    fn only_timeout_reports_is_timeout() {
        assert!(ApiError::Timeout("slow".to_string()).is_timeout());
        assert!(!ApiError::Transport("refused".to_string()).is_timeout());
        assert!(!ApiError::Application("bad".to_string()).is_timeout());
    }

    #[test]
    fn transport_timeouts_become_retryable_timeouts() {
        let err = ApiError::from(TransportError::Timeout("read timed out".to_string()));
        assert!(err.is_timeout());
        let err = ApiError::from(TransportError::Tls("no certificates".to_string()));
        assert!(matches!(err, ApiError::Transport(ref m) if m == "tls: no certificates"));
    }
}

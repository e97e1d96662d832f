//! Proxy error kinds and their client-facing responses.
//!
//! # Design Decisions
//! - Every user-visible failure maps to a fixed plain-text body
//! - Internal detail (IO errors, decoder messages) is logged, never returned
//! - Transport errors never reach the client directly; the retry controller
//!   turns them into `RetryExhausted` once the budget is spent

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

/// Body returned when the `PROXYKEY` check fails.
pub const AUTH_REJECTED_BODY: &str = "Missing or invalid PROXYKEY header.";
/// Body returned when the path is not `/{subdomain}/{path}`.
pub const MALFORMED_PATH_BODY: &str = "URL format invalid.";
/// Body returned when the inbound body exceeds the configured limit.
pub const BODY_TOO_LARGE_BODY: &str = "Request body too large.";
/// Body returned when the inbound body could not be read to completion.
pub const BODY_UNREADABLE_BODY: &str = "Failed to read request body.";
/// Body returned when every upstream attempt failed at the transport level.
pub const RETRY_EXHAUSTED_BODY: &str = "Proxy failed to connect. Please try again.";
/// Body returned when an encoded upstream body could not be decoded.
pub const DECODE_FAILURE_BODY: &str = "Failed to decompress upstream response.";

/// Errors that terminate a proxied request.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("caller key missing or invalid")]
    AuthRejected,

    #[error("path must have the form /{{subdomain}}/{{path}}")]
    MalformedPath,

    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("failed to read request body: {source}")]
    BodyUnreadable {
        #[source]
        source: axum::Error,
    },

    #[error("upstream unreachable after {attempts} attempts")]
    RetryExhausted { attempts: u32 },

    #[error("failed to decode {encoding} body: {source}")]
    DecodeFailure {
        encoding: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while talking to the upstream. Recovered by retrying.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("upstream did not respond within {0:?}")]
    Timeout(std::time::Duration),

    #[error("upstream exchange failed: {0}")]
    Io(String),
}

impl ProxyError {
    /// Status code sent to the caller for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::AuthRejected => StatusCode::PROXY_AUTHENTICATION_REQUIRED,
            ProxyError::MalformedPath | ProxyError::BodyUnreadable { .. } => {
                StatusCode::BAD_REQUEST
            }
            ProxyError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::RetryExhausted { .. } | ProxyError::DecodeFailure { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Fixed, non-leaking body sent to the caller for this error.
    pub fn client_message(&self) -> &'static str {
        match self {
            ProxyError::AuthRejected => AUTH_REJECTED_BODY,
            ProxyError::MalformedPath => MALFORMED_PATH_BODY,
            ProxyError::BodyTooLarge { .. } => BODY_TOO_LARGE_BODY,
            ProxyError::BodyUnreadable { .. } => BODY_UNREADABLE_BODY,
            ProxyError::RetryExhausted { .. } => RETRY_EXHAUSTED_BODY,
            ProxyError::DecodeFailure { .. } => DECODE_FAILURE_BODY,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (
            self.status(),
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.client_message(),
        )
            .into_response()
    }
}

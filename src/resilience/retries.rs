//! Retry logic.
//!
//! # Responsibilities
//! - Drive upstream attempts until one completes or the budget is spent
//! - Build a fresh request for every attempt
//! - Produce the terminal `RetryExhausted` error
//!
//! # Design Decisions
//! - Only transport failures are retried; any HTTP status is a completed exchange
//! - Explicit bounded loop, no recursion
//! - No backoff between attempts
//! - Attempts are sequential within a request

use std::time::Duration;

use crate::error::{ProxyError, TransportError};
use crate::http::client::{OutboundRequest, Transport, UpstreamResponse};
use crate::observability::metrics;
use crate::resilience::timeouts::with_deadline;

/// Bounds for one retry controller invocation.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts allowed, including the first.
    pub max_attempts: u32,
    /// Deadline applied to each attempt.
    pub attempt_timeout: Duration,
}

/// Send a request built by `build` until the transport returns a response.
///
/// `build` is called once per attempt with the attempt number (starting at 1).
pub async fn send_with_retries<T, F>(
    transport: &T,
    policy: RetryPolicy,
    mut build: F,
) -> Result<UpstreamResponse, ProxyError>
where
    T: Transport + ?Sized,
    F: FnMut(u32) -> OutboundRequest,
{
    let mut attempt = 1;

    while attempt <= policy.max_attempts {
        let request = build(attempt);
        let uri = request.uri.clone();

        match with_deadline(policy.attempt_timeout, transport.send(request)).await {
            Ok(response) => {
                metrics::record_upstream_attempt("success");
                return Ok(response);
            }
            Err(e) => {
                metrics::record_upstream_attempt(outcome_label(&e));
                tracing::warn!(
                    uri = %uri,
                    attempt,
                    max_attempts = policy.max_attempts,
                    error = %e,
                    "Upstream attempt failed"
                );
            }
        }

        attempt += 1;
    }

    Err(ProxyError::RetryExhausted { attempts: policy.max_attempts })
}

fn outcome_label(err: &TransportError) -> &'static str {
    match err {
        TransportError::Connect(_) => "connect_error",
        TransportError::Timeout(_) => "timeout",
        TransportError::Io(_) => "io_error",
    }
}

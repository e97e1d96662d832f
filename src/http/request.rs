//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4)
//! - Buffer the inbound body for replay across attempts
//! - Prepare one outbound request per attempt
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Body buffered once with a size cap; each attempt gets a cheap clone
//! - Inbound request kept intact; a modified copy is forwarded
//! - Only the length limit maps to 413; any other read failure is the caller's (400)

use axum::{
    body::{Body, Bytes},
    http::{request::Parts, HeaderMap, HeaderName, HeaderValue, Method, Request, Uri},
};
use http_body_util::LengthLimitError;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::config::UpstreamConfig;
use crate::error::ProxyError;
use crate::http::client::OutboundRequest;
use crate::routing::UpstreamTarget;
use crate::security::headers::outbound_headers;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Read the request ID assigned to this request, if any.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Buffer the whole inbound body, failing when it exceeds `limit` bytes.
pub async fn buffer_body(body: Body, limit: usize) -> Result<Bytes, ProxyError> {
    axum::body::to_bytes(body, limit).await.map_err(|e| {
        if exceeds_limit(&e) {
            tracing::warn!(limit, "Request body over limit");
            ProxyError::BodyTooLarge { limit }
        } else {
            tracing::warn!(error = %e, "Failed to read request body");
            ProxyError::BodyUnreadable { source: e }
        }
    })
}

fn exceeds_limit(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}

/// Inbound request data every attempt is rebuilt from.
#[derive(Debug)]
pub struct ForwardContext<'a> {
    pub method: &'a Method,
    pub headers: &'a HeaderMap,
    pub body: &'a Bytes,
    /// Upstream URI resolved from the inbound path and query.
    pub uri: Uri,
}

impl<'a> ForwardContext<'a> {
    /// Resolve the upstream URI for `target` and capture the inbound parts.
    pub fn new(
        parts: &'a Parts,
        body: &'a Bytes,
        target: &UpstreamTarget,
        upstream: &UpstreamConfig,
    ) -> Result<Self, ProxyError> {
        Ok(Self {
            method: &parts.method,
            headers: &parts.headers,
            body,
            uri: target.uri(upstream, parts.uri.query())?,
        })
    }

    /// Build a fresh outbound request for one attempt.
    pub fn build(&self, upstream: &UpstreamConfig) -> OutboundRequest {
        OutboundRequest {
            method: self.method.clone(),
            uri: self.uri.clone(),
            headers: outbound_headers(self.headers, upstream),
            body: self.body.clone(),
        }
    }
}

//! Header filtering in both directions.
//!
//! # Responsibilities
//! - Strip caller credentials and internal trust headers before forwarding
//! - Pin `User-Agent` and `Accept-Encoding` on upstream requests
//! - Strip hop-by-hop and body-framing headers from upstream responses
//!
//! # Design Decisions
//! - Never trust the internal trust header from callers
//! - Request headers are last-wins; response headers keep every value
//! - `Content-Encoding` survives only when the body was passed through undecoded

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

use crate::config::UpstreamConfig;

/// Header carrying the caller's proxy key.
pub const PROXY_KEY_HEADER: HeaderName = HeaderName::from_static("proxykey");

/// Header the upstream family uses for internal trust decisions.
pub const TRUST_HEADER: HeaderName = HeaderName::from_static("roblox-id");

/// The only coding requested from upstreams.
pub const UPSTREAM_ACCEPT_ENCODING: HeaderValue = HeaderValue::from_static("gzip");

/// Connection-scoped headers that never cross the proxy.
const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(name)
}

/// Build the header set for an upstream request from the caller's headers.
pub fn outbound_headers(inbound: &HeaderMap, upstream: &UpstreamConfig) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(inbound.len() + 2);

    for (name, value) in inbound {
        if is_hop_by_hop(name)
            || name == header::HOST
            || name == header::CONTENT_LENGTH
            || name == PROXY_KEY_HEADER
            || name == TRUST_HEADER
            || is_blocked(name, &upstream.blocked_headers)
        {
            continue;
        }
        headers.insert(name.clone(), value.clone());
    }

    match HeaderValue::from_str(&upstream.user_agent) {
        Ok(ua) => {
            headers.insert(header::USER_AGENT, ua);
        }
        Err(_) => tracing::warn!(user_agent = %upstream.user_agent, "Invalid User-Agent, keeping caller's"),
    }
    headers.insert(header::ACCEPT_ENCODING, UPSTREAM_ACCEPT_ENCODING);

    headers
}

fn is_blocked(name: &HeaderName, blocked: &[String]) -> bool {
    blocked.iter().any(|b| name.as_str().eq_ignore_ascii_case(b))
}

/// Build the header set returned to the caller from an upstream response.
///
/// `Content-Length` is always dropped since the body may have been rewritten.
/// `Content-Encoding` is dropped unless `encoding_retained` is set.
pub fn client_headers(upstream: &HeaderMap, encoding_retained: bool) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(upstream.len());

    for (name, value) in upstream {
        if is_hop_by_hop(name) || name == header::CONTENT_LENGTH {
            continue;
        }
        if name == header::CONTENT_ENCODING && !encoding_retained {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    headers
}

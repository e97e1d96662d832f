//! Caller authentication via the `PROXYKEY` header.

use axum::http::HeaderMap;

use crate::error::ProxyError;
use crate::security::headers::PROXY_KEY_HEADER;

/// Check the caller's key against the configured one.
///
/// With no key configured every caller is accepted.
pub fn check_proxy_key(headers: &HeaderMap, expected: Option<&str>) -> Result<(), ProxyError> {
    let Some(expected) = expected else {
        return Ok(());
    };

    let supplied = headers
        .get(PROXY_KEY_HEADER)
        .map(|v| v.as_bytes())
        .unwrap_or_default();

    if constant_time_eq(supplied, expected.as_bytes()) {
        Ok(())
    } else {
        Err(ProxyError::AuthRejected)
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

//! Upstream resolution from the request path.
//!
//! # Responsibilities
//! - Split `/{subdomain}/{path}` on the first `/` after the leading slash
//! - Reject paths with a missing or empty segment
//! - Build the outbound URI from the resolved target
//!
//! # Design Decisions
//! - Pure function of the path; no config lookups during the split
//! - Subdomain restricted to host-label characters so the authority is always valid
//! - Query string carried through to the upstream unchanged

use axum::http::Uri;

use crate::config::UpstreamConfig;
use crate::error::ProxyError;

/// The upstream a request is forwarded to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamTarget {
    subdomain: String,
    path: String,
}

impl UpstreamTarget {
    /// Subdomain prepended to the upstream domain.
    pub fn subdomain(&self) -> &str {
        &self.subdomain
    }

    /// Path on the upstream host, without the leading slash.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Build `{scheme}://{subdomain}.{domain}/{path}[?query]`.
    pub fn uri(&self, upstream: &UpstreamConfig, query: Option<&str>) -> Result<Uri, ProxyError> {
        let mut uri = format!(
            "{}://{}.{}/{}",
            upstream.scheme, self.subdomain, upstream.domain, self.path
        );
        if let Some(query) = query {
            uri.push('?');
            uri.push_str(query);
        }
        uri.parse().map_err(|e| {
            tracing::debug!(uri = %uri, error = %e, "Resolved URI is not valid");
            ProxyError::MalformedPath
        })
    }
}

/// Resolve an inbound path (with its leading slash) into an upstream target.
pub fn resolve(path: &str) -> Result<UpstreamTarget, ProxyError> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);

    let (subdomain, rest) = trimmed.split_once('/').ok_or(ProxyError::MalformedPath)?;
    if subdomain.is_empty() || rest.is_empty() || !is_host_labels(subdomain) {
        return Err(ProxyError::MalformedPath);
    }

    Ok(UpstreamTarget {
        subdomain: subdomain.to_string(),
        path: rest.to_string(),
    })
}

fn is_host_labels(s: &str) -> bool {
    s.split('.').all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
    })
}

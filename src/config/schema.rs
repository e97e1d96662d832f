//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (port, inbound limits).
    pub listener: ListenerConfig,

    /// Upstream family and outbound client settings.
    pub upstream: UpstreamConfig,

    /// Caller authentication.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// TCP port to listen on (all interfaces).
    pub port: u16,

    /// Maximum buffered request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            max_body_bytes: 10 * 1024 * 1024, // 10MB
        }
    }
}

impl ListenerConfig {
    /// Address the listener binds to.
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

/// Upstream configuration.
///
/// Requests for `/{subdomain}/{path}` go to `{scheme}://{subdomain}.{domain}/{path}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// URI scheme for upstream calls ("https" or "http").
    pub scheme: String,

    /// Parent domain every subdomain is appended to.
    pub domain: String,

    /// Per-attempt upstream timeout in seconds.
    pub timeout_secs: u64,

    /// Maximum number of upstream attempts per request.
    pub max_attempts: u32,

    /// User-Agent sent on every upstream request.
    pub user_agent: String,

    /// Additional request headers never forwarded upstream.
    pub blocked_headers: Vec<String>,

    /// Upper bound for a decoded response body in bytes.
    pub max_decoded_bytes: usize,

    /// How long idle pooled connections are kept, in seconds.
    pub pool_idle_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            scheme: "https".to_string(),
            domain: "roblox.com".to_string(),
            timeout_secs: 30,
            max_attempts: 3,
            user_agent: "RoProxy".to_string(),
            blocked_headers: Vec::new(),
            max_decoded_bytes: 64 * 1024 * 1024, // 64MB
            pool_idle_secs: 60,
        }
    }
}

/// Caller authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SecurityConfig {
    /// Required value of the `PROXYKEY` header. `None` disables the check.
    pub proxy_key: Option<String>,
}

impl SecurityConfig {
    /// The configured key, treating an empty string as unset.
    pub fn required_key(&self) -> Option<&str> {
        self.proxy_key.as_deref().filter(|k| !k.is_empty())
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format ("pretty" or "json").
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid, attempts >= 1)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use crate::config::schema::ProxyConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

/// Check a loaded configuration for semantic errors.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.port == 0 {
        errors.push(ValidationError::new("listener.port", "must be non-zero"));
    }
    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::new("listener.max_body_bytes", "must be greater than 0"));
    }

    let upstream = &config.upstream;
    if !matches!(upstream.scheme.as_str(), "http" | "https") {
        errors.push(ValidationError::new(
            "upstream.scheme",
            format!("unsupported scheme '{}'", upstream.scheme),
        ));
    }
    if upstream.domain.trim().is_empty() {
        errors.push(ValidationError::new("upstream.domain", "must not be empty"));
    }
    if upstream.timeout_secs == 0 {
        errors.push(ValidationError::new(
            "upstream.timeout_secs",
            "must be greater than 0 (0 does not disable the timeout; every attempt needs a deadline)",
        ));
    }
    if upstream.max_attempts == 0 {
        errors.push(ValidationError::new("upstream.max_attempts", "must be at least 1"));
    }
    if upstream.max_decoded_bytes == 0 {
        errors.push(ValidationError::new("upstream.max_decoded_bytes", "must be greater than 0"));
    }
    if upstream.user_agent.parse::<axum::http::HeaderValue>().is_err() {
        errors.push(ValidationError::new("upstream.user_agent", "not a valid header value"));
    }

    if !matches!(config.observability.log_format.as_str(), "pretty" | "json") {
        errors.push(ValidationError::new(
            "observability.log_format",
            format!("expected 'pretty' or 'json', got '{}'", config.observability.log_format),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

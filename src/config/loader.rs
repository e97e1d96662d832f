//! Configuration loading from disk and process-level overrides.

use std::fs;
use std::path::Path;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Values supplied at process start (CLI flags or environment) that take
/// precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub timeout_secs: Option<u64>,
    pub max_attempts: Option<u32>,
    pub proxy_key: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
    pub metrics_address: Option<String>,
}

impl ConfigOverrides {
    /// Apply every override that is set.
    pub fn apply(self, config: &mut ProxyConfig) {
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(timeout) = self.timeout_secs {
            config.upstream.timeout_secs = timeout;
        }
        if let Some(attempts) = self.max_attempts {
            config.upstream.max_attempts = attempts;
        }
        if let Some(key) = self.proxy_key {
            config.security.proxy_key = Some(key);
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
        if let Some(format) = self.log_format {
            config.observability.log_format = format;
        }
        if let Some(address) = self.metrics_address {
            config.observability.metrics_enabled = true;
            config.observability.metrics_address = address;
        }
    }
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    resolve_config(Some(path), ConfigOverrides::default())
}

/// Build the process configuration: defaults, then the optional file, then
/// overrides. The result is validated before it is returned.
pub fn resolve_config(
    path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<ProxyConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => ProxyConfig::default(),
    };

    overrides.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let config = resolve_config(None, ConfigOverrides::default()).unwrap();
        assert_eq!(config.listener.port, 8080);
        assert_eq!(config.upstream.max_attempts, 3);
    }

    #[test]
    fn test_overrides_win_over_file() {
        let path = std::env::temp_dir().join(format!("roproxy-loader-{}.toml", std::process::id()));
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "[listener]\nport = 9000\n[upstream]\nmax_attempts = 7").unwrap();

        let overrides = ConfigOverrides {
            max_attempts: Some(2),
            proxy_key: Some("secret".into()),
            ..Default::default()
        };
        let config = resolve_config(Some(&path), overrides).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(config.listener.port, 9000);
        assert_eq!(config.upstream.max_attempts, 2);
        assert_eq!(config.security.required_key(), Some("secret"));
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let overrides = ConfigOverrides {
            max_attempts: Some(0),
            ..Default::default()
        };
        let err = resolve_config(None, overrides).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().contains("upstream.max_attempts"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/roproxy.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}

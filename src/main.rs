//! roproxy: path-routed reverse proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────┐
//!                      │                     PROXY                        │
//!   Client Request     │  ┌──────────┐   ┌──────────┐   ┌─────────────┐   │
//!   ───────────────────┼─▶│  server  │──▶│ security │──▶│  routing    │   │
//!                      │  │ handler  │   │ PROXYKEY │   │  resolver   │   │
//!                      │  └──────────┘   └──────────┘   └──────┬──────┘   │
//!                      │                                       ▼          │
//!                      │                               ┌─────────────┐    │
//!                      │                               │ resilience  │    │     https://{sub}
//!                      │                               │ retries +   │────┼───▶ .roblox.com
//!                      │                               │ timeouts    │    │
//!                      │                               └──────┬──────┘    │
//!   Client Response    │  ┌──────────┐   ┌──────────┐         │          │
//!   ◀──────────────────┼──│ headers  │◀──│ response │◀────────┘          │
//!                      │  │ filter   │   │ decode   │                    │
//!                      │  └──────────┘   └──────────┘                    │
//!                      └──────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use roproxy::config::{resolve_config, ConfigOverrides};
use roproxy::lifecycle::{signals::spawn_signal_listener, Shutdown};
use roproxy::observability::{logging, metrics};
use roproxy::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "roproxy")]
#[command(about = "Path-routed reverse proxy", long_about = None)]
struct Cli {
    /// Optional TOML config file.
    #[arg(short, long, env = "PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on.
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Upstream timeout per attempt, in seconds (must be > 0; 0 is not "unlimited").
    #[arg(long, env = "TIMEOUT")]
    timeout: Option<u64>,

    /// Maximum upstream attempts per request.
    #[arg(long, env = "RETRIES")]
    retries: Option<u32>,

    /// Required PROXYKEY header value.
    #[arg(long, env = "KEY", hide_env_values = true)]
    key: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format (pretty or json).
    #[arg(long, env = "LOG_FORMAT")]
    log_format: Option<String>,

    /// Enable the Prometheus endpoint on this address.
    #[arg(long, env = "METRICS_ADDRESS")]
    metrics_address: Option<String>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            port: self.port,
            timeout_secs: self.timeout,
            max_attempts: self.retries,
            proxy_key: self.key.clone(),
            log_level: self.log_level.clone(),
            log_format: self.log_format.clone(),
            metrics_address: self.metrics_address.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(cli.config.as_deref(), cli.overrides())?;

    logging::init_logging(&config.observability);
    tracing::info!("roproxy v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        port = config.listener.port,
        timeout_secs = config.upstream.timeout_secs,
        max_attempts = config.upstream.max_attempts,
        proxy_key_required = config.security.required_key().is_some(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    spawn_signal_listener(shutdown);

    let server = HttpServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

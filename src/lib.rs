//! Path-routed reverse proxy library.
//!
//! Requests for `/{subdomain}/{path}` are forwarded to
//! `https://{subdomain}.roblox.com/{path}` with caller credentials stripped,
//! upstream encodings decoded and transport failures retried.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod routing;
pub mod security;

pub use config::ProxyConfig;
pub use error::{ProxyError, TransportError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;

//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → server.rs handler (PROXYKEY check, path resolution)
//!     → request.rs (buffer body, build outbound request per attempt)
//!     → client.rs (one upstream exchange, driven by resilience::retries)
//!     → response.rs (decode body, filter headers)
//!     → Send to client
//! ```

pub mod client;
pub mod request;
pub mod response;
pub mod server;

pub use client::{HttpTransport, OutboundRequest, Transport, UpstreamResponse};
pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::HttpServer;

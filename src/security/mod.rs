//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → auth.rs (PROXYKEY check, when configured)
//!     → headers.rs (strip credentials and trust headers, pin UA/encoding)
//!     → Pass to upstream
//!
//! Upstream response:
//!     → headers.rs (strip hop-by-hop and framing headers)
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on a missing or wrong key
//! - No trust in client input: the internal trust header is always removed

pub mod auth;
pub mod headers;

pub use auth::check_proxy_key;
pub use headers::{client_headers, outbound_headers, PROXY_KEY_HEADER, TRUST_HEADER};

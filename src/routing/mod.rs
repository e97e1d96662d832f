//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path, query)
//!     → resolver.rs (split /{subdomain}/{path})
//!     → Return: UpstreamTarget or MalformedPath
//!
//! Per attempt:
//!     UpstreamTarget + UpstreamConfig
//!     → {scheme}://{subdomain}.{domain}/{path}
//! ```
//!
//! # Design Decisions
//! - Single fixed rule; no route table
//! - Deterministic: same path always resolves to the same upstream
//! - Resolution happens before any upstream call

pub mod resolver;

pub use resolver::{resolve, UpstreamTarget};

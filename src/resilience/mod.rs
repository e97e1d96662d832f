//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → retries.rs (build attempt, count, give up after max_attempts)
//!     → timeouts.rs (deadline per attempt)
//!     → http::client (one exchange)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every upstream call has a deadline
//! - Connection-level failures are retried regardless of method
//! - Exhaustion yields a single synthetic 500

pub mod retries;
pub mod timeouts;

pub use retries::{send_with_retries, RetryPolicy};

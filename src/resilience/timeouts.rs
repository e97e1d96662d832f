//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap each upstream attempt with a deadline
//! - Turn an elapsed deadline into a transport error
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - An elapsed deadline is retryable like any other transport failure

use std::future::Future;
use std::time::Duration;

use crate::error::TransportError;

/// Run `fut`, failing with `TransportError::Timeout` once `deadline` elapses.
pub async fn with_deadline<T, F>(deadline: Duration, fut: F) -> Result<T, TransportError>
where
    F: Future<Output = Result<T, TransportError>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(TransportError::Timeout(deadline)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completes_within_deadline() {
        let result = with_deadline(Duration::from_secs(1), async { Ok::<_, TransportError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_deadline_is_timeout() {
        let result = with_deadline(Duration::from_millis(50), async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok::<_, TransportError>(())
        })
        .await;
        assert!(matches!(result, Err(TransportError::Timeout(d)) if d == Duration::from_millis(50)));
    }
}

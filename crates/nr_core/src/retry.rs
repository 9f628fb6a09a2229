//! Timeout and bounded retry for calls to external services.
//!
//! Every attempt runs under [`RetryPolicy::timeout`]. Transient failures
//! (see [`Error::is_transient`]) are retried with exponential backoff:
//!
//! ```text
//! delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..=jitter)
//! ```

use std::future::Future;
use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{error, warn};

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; zero disables retrying
    pub max_retries: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub jitter: Duration,
    /// Budget for a single attempt
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            jitter: Duration::from_millis(250),
            timeout: Duration::from_secs(120),
        }
    }
}

impl RetryPolicy {
    /// Single attempt with the given timeout.
    pub fn no_retry(timeout: Duration) -> Self {
        Self {
            max_retries: 0,
            timeout,
            ..Self::default()
        }
    }

    pub fn backoff(&self, attempt: usize) -> Duration {
        let shift = attempt.saturating_sub(1).min(16) as u32;
        let delay = self.base_delay.saturating_mul(1 << shift).min(self.max_delay);
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return delay;
        }
        delay + Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
    }
}

/// Runs `call` until it succeeds, fails permanently or runs out of retries.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, operation: &str, mut call: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let total_t0 = Instant::now();
    let mut attempt = 0usize;

    loop {
        let outcome = match tokio::time::timeout(policy.timeout, call()).await {
            Ok(outcome) => outcome,
            Err(_) => Err(Error::Timeout {
                operation: operation.to_string(),
                after: policy.timeout,
            }),
        };

        let e = match outcome {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        attempt += 1;
        if !e.is_transient() {
            return Err(e);
        }
        if attempt > policy.max_retries {
            error!(
                operation,
                attempt,
                max = policy.max_retries,
                elapsed_ms_total = total_t0.elapsed().as_millis() as u64,
                error = %e,
                "retries exhausted"
            );
            return Err(e);
        }

        let delay = policy.backoff(attempt);
        warn!(
            operation,
            attempt,
            max = policy.max_retries,
            ?delay,
            error = %e,
            "attempt failed; backing off"
        );
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast_policy(max_retries: usize) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            jitter: Duration::ZERO,
            timeout: Duration::from_secs(5),
        }
    }

    fn unavailable() -> Error {
        Error::Upstream {
            service: "test".to_string(),
            status: 503,
            body: String::new(),
        }
    }

    #[tokio::test]
    async fn test_retries_transient_until_success() {
        let calls = AtomicUsize::new(0);
        let result = with_retry(&fast_policy(3), "test", || async {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(unavailable())
            } else {
                Ok("done")
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_stops_after_max_retries() {
        let calls = AtomicUsize::new(0);
        let result: Result<()> = with_retry(&fast_policy(2), "test", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(unavailable())
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_error_is_not_retried() {
        let calls = AtomicUsize::new(0);
        let result: Result<()> = with_retry(&fast_policy(5), "test", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(Error::Inference("bad request".to_string()))
        })
        .await;

        assert!(matches!(result, Err(Error::Inference(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_attempt_timeout() {
        let policy = RetryPolicy {
            timeout: Duration::from_millis(10),
            ..fast_policy(0)
        };
        let result: Result<()> = with_retry(&policy, "slow call", || async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        match result {
            Err(Error::Timeout { operation, .. }) => assert_eq!(operation, "slow call"),
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[test]
    fn test_backoff_is_capped() {
        let policy = RetryPolicy {
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            jitter: Duration::ZERO,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.backoff(1), Duration::from_secs(1));
        assert_eq!(policy.backoff(3), Duration::from_secs(4));
        assert_eq!(policy.backoff(10), Duration::from_secs(30));
    }
}

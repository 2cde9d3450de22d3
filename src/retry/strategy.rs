// src/retry/strategy.rs

use crate::config::RetryConfig;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Caller-side retry with exponential backoff and jitter.
#[derive(Debug, Clone)]
pub struct RetryStrategy {
    config: RetryConfig,
}

impl RetryStrategy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Execute a function with retry logic, returning the last error once
    /// `max_attempts` is exhausted.
    pub async fn execute<F, Fut, T, E>(&self, mut f: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt = 0;

        loop {
            attempt += 1;

            match f().await {
                Ok(result) => return Ok(result),
                Err(error) => {
                    if attempt >= self.config.max_attempts {
                        warn!("Retry failed after {} attempts: {}", attempt, error);
                        return Err(error);
                    }

                    let backoff = self.calculate_backoff(attempt);
                    debug!(
                        "Attempt {} failed: {}. Retrying in {:?}",
                        attempt, error, backoff
                    );

                    sleep(backoff).await;
                }
            }
        }
    }

    /// Calculate exponential backoff with jitter
    fn calculate_backoff(&self, attempt: u32) -> Duration {
        let capped = self.base_backoff(attempt);

        // Add jitter (0-25% of the calculated backoff)
        let jitter = (capped as f64 * rand::random::<f64>() * 0.25) as u64;

        Duration::from_millis(capped + jitter)
    }

    fn base_backoff(&self, attempt: u32) -> u64 {
        let base = self.config.backoff_base().as_millis() as u64;
        let max = self.config.backoff_max().as_millis() as u64;

        // Exponential backoff: base * 2^(attempt - 1)
        let exponential =
            base.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));

        exponential.min(max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn strategy(max_attempts: u32) -> RetryStrategy {
        RetryStrategy::new(RetryConfig {
            max_attempts,
            backoff_base_ms: 1,
            backoff_max_ms: 5,
        })
    }

    #[tokio::test]
    async fn test_retry_success_after_failures() {
        let strategy = strategy(3);
        let counter = AtomicU32::new(0);

        let result = strategy
            .execute(|| async {
                let count = counter.fetch_add(1, Ordering::SeqCst);
                if count < 2 {
                    Err("Temporary failure")
                } else {
                    Ok("Success")
                }
            })
            .await;

        assert_eq!(result.unwrap(), "Success");
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_max_attempts() {
        let strategy = strategy(2);
        let counter = AtomicU32::new(0);

        let result: Result<(), &str> = strategy
            .execute(|| async {
                counter.fetch_add(1, Ordering::SeqCst);
                Err("Always fails")
            })
            .await;

        assert_eq!(result.unwrap_err(), "Always fails");
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_backoff_doubles_then_caps() {
        let strategy = RetryStrategy::new(RetryConfig {
            max_attempts: 10,
            backoff_base_ms: 10,
            backoff_max_ms: 50,
        });

        assert_eq!(strategy.base_backoff(1), 10);
        assert_eq!(strategy.base_backoff(2), 20);
        assert_eq!(strategy.base_backoff(3), 40);
        assert_eq!(strategy.base_backoff(4), 50);

        let backoff = strategy.calculate_backoff(4);
        assert!(backoff >= Duration::from_millis(50));
        assert!(backoff <= Duration::from_millis(62));
    }
}

//! Bounded retry for operations that abort without side effects.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

use crate::error::DomainError;

/// Exponential backoff policy applied to transient domain errors.
///
/// Only errors for which [`DomainError::is_transient`] holds are retried;
/// anything else is returned on the first attempt.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: max_delay.max(base_delay),
        }
    }

    /// Retry immediately, up to `max_attempts` total tries.
    pub fn immediate(max_attempts: usize) -> Self {
        Self::new(max_attempts, Duration::ZERO, Duration::ZERO)
    }

    fn next_delay(&self, attempt: usize) -> Duration {
        let factor = 2_u32.saturating_pow(attempt as u32);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out.
    /// `op` receives the zero-based attempt number.
    pub async fn run<F, Fut, T>(&self, mut op: F) -> Result<T, DomainError>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<T, DomainError>>,
    {
        let mut attempt = 0;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt + 1 < self.max_attempts => {
                    let delay = self.next_delay(attempt);
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Transient failure, retrying"
                    );
                    attempt += 1;
                    if !delay.is_zero() {
                        sleep(delay).await;
                    }
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(20), Duration::from_millis(200))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_grows_and_caps() {
        let policy = RetryPolicy::new(5, Duration::from_millis(20), Duration::from_millis(50));
        assert_eq!(policy.next_delay(0), Duration::from_millis(20));
        assert_eq!(policy.next_delay(1), Duration::from_millis(40));
        assert_eq!(policy.next_delay(2), Duration::from_millis(50));
    }

    #[test]
    fn test_new_clamps_attempts() {
        assert_eq!(RetryPolicy::immediate(0).max_attempts, 1);
    }

    #[tokio::test]
    async fn test_retries_transient_until_success() {
        let policy = RetryPolicy::immediate(3);
        let result = policy
            .run(|attempt| async move {
                if attempt < 2 {
                    Err(DomainError::Conflict("serialization failure".into()))
                } else {
                    Ok(attempt)
                }
            })
            .await;
        assert_eq!(result.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let policy = RetryPolicy::immediate(3);
        let mut tries = 0;
        let result: Result<(), _> = policy
            .run(|_| {
                tries += 1;
                async { Err(DomainError::Unavailable("down".into())) }
            })
            .await;
        assert!(matches!(result, Err(DomainError::Unavailable(_))));
        assert_eq!(tries, 3);
    }

    #[tokio::test]
    async fn test_permanent_error_is_not_retried() {
        let policy = RetryPolicy::immediate(5);
        let mut tries = 0;
        let result: Result<(), _> = policy
            .run(|_| {
                tries += 1;
                async {
                    Err(DomainError::NotFound {
                        entity_type: "post",
                        id: 7,
                    })
                }
            })
            .await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
        assert_eq!(tries, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_sleeps_between_attempts() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100), Duration::from_secs(1));
        let started = tokio::time::Instant::now();
        let _: Result<(), _> = policy
            .run(|_| async { Err(DomainError::Conflict("busy".into())) })
            .await;
        assert!(started.elapsed() >= Duration::from_millis(300));
    }
}

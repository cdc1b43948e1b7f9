use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Source of wall-clock delay. Swapped out in tests.
pub trait Sleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}

/// Bounded retries with exponential backoff: after failed attempt `n` the
/// policy waits `base_delay * 2^(n-1)`. Every error is treated as retryable
/// and the last one is returned unchanged.
#[derive(Debug, Clone)]
pub struct RetryPolicy<S = TokioSleeper> {
    max_attempts: u32,
    base_delay: Duration,
    sleeper: S,
}

impl RetryPolicy<TokioSleeper> {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self::with_sleeper(max_attempts, base_delay, TokioSleeper)
    }
}

impl<S: Sleeper> RetryPolicy<S> {
    pub fn with_sleeper(max_attempts: u32, base_delay: Duration, sleeper: S) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            sleeper,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    pub async fn execute<T, E, F, Fut>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= self.max_attempts => {
                    warn!("giving up after {} attempts: {}", attempt, e);
                    return Err(e);
                }
                Err(e) => {
                    let delay = self.delay_for(attempt);
                    debug!(
                        "attempt {}/{} failed: {}; retrying in {:?}",
                        attempt, self.max_attempts, e, delay
                    );
                    self.sleeper.sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

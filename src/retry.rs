//! Retry with exponential backoff around a fallible async operation.
//!
//! The policy knows nothing about translation: it takes an operation, a
//! maximum number of attempts, an initial delay and a multiplier, and returns
//! either the first success or the last error once it gives up. With a 1 s
//! initial delay and a multiplier of 2 the waits are 1 s → 2 s → 4 s.

use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Errors that can tell the policy whether another attempt makes sense.
pub trait Retryable {
    fn is_retryable(&self) -> bool {
        true
    }
}

/// Returned by [`RetryPolicy::run`] when no attempt succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exhausted<E> {
    /// Attempts actually made (≤ `max_attempts`; fewer if the error was not retryable).
    pub attempts: u32,
    /// The error of the final attempt.
    pub last: E,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Values below 1 behave as 1.
    pub max_attempts: u32,
    /// Wait before the second attempt.
    pub initial_delay: Duration,
    /// Factor applied to the delay after every retry.
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

impl RetryPolicy {
    /// Doubling backoff starting at `initial_delay`.
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            multiplier: 2,
        }
    }

    pub fn with_multiplier(mut self, multiplier: u32) -> Self {
        self.multiplier = multiplier.max(1);
        self
    }

    /// Delay slept before retry number `retry` (1-indexed).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exp = retry.saturating_sub(1);
        self.initial_delay
            .saturating_mul(self.multiplier.saturating_pow(exp))
    }

    /// Run `op` until it succeeds, returns a non-retryable error, or the
    /// attempt budget is spent. `op` receives the 1-indexed attempt number.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, Exhausted<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + fmt::Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if attempt >= max_attempts || !e.is_retryable() {
                        return Err(Exhausted { attempts: attempt, last: e });
                    }
                    let delay = self.delay_for(attempt);
                    warn!(
                        "attempt {}/{} failed: {}; retrying in {}ms",
                        attempt,
                        max_attempts,
                        e,
                        delay.as_millis()
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

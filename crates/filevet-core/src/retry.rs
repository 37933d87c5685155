//! Bounded retry with incremental backoff and an overall deadline.
//!
//! Every operation that has to tolerate a transient "not ready yet" condition
//! (unscanned files, flaky transport) goes through [`RetryPolicy::attempt`].
//! Each `attempt` call is independent; no backoff state is shared between
//! invocations. The backoff wait is a plain `tokio::time::sleep`, so dropping
//! the calling task cancels an in-progress backoff immediately.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};

/// How a single invocation of a retried operation failed.
#[derive(Debug)]
pub enum AttemptFailure<E> {
    /// The condition may clear on a later invocation; back off and try again.
    Retryable(E),
    /// No amount of retrying helps; propagate immediately.
    Fatal(E),
}

/// Terminal failure of a whole [`RetryPolicy::attempt`] call.
#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    /// The projected next backoff would have run past the deadline.
    #[error("retry budget exhausted after {attempts} attempts ({elapsed:?}): {last}")]
    TimedOut {
        attempts: u32,
        elapsed: Duration,
        last: E,
    },
    /// The operation reported a non-retryable failure.
    #[error("{0}")]
    Fatal(E),
}

/// Bounded-retry executor: linear backoff capped at `max_delay`, whole call
/// capped at `timeout`.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub base_delay: Duration,
    pub delay_increment: Duration,
    pub max_delay: Duration,
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(500),
            delay_increment: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
            timeout: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Invoke `operation` until it succeeds, fails fatally, or the retry
    /// budget runs out.
    ///
    /// The deadline check happens before sleeping: if the next backoff would
    /// end past `timeout`, the call fails with [`RetryError::TimedOut`] right
    /// away instead of sleeping and then failing.
    pub async fn attempt<T, E, F, Fut>(&self, mut operation: F) -> Result<T, RetryError<E>>
    where
        E: std::fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AttemptFailure<E>>>,
    {
        let started = Instant::now();
        let deadline = started + self.timeout;
        let mut delay = self.base_delay;
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            match operation().await {
                Ok(value) => return Ok(value),
                Err(AttemptFailure::Fatal(err)) => return Err(RetryError::Fatal(err)),
                Err(AttemptFailure::Retryable(err)) => {
                    let now = Instant::now();
                    if now + delay > deadline {
                        return Err(RetryError::TimedOut {
                            attempts,
                            elapsed: now - started,
                            last: err,
                        });
                    }
                    tracing::debug!(
                        attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Operation not ready, backing off"
                    );
                    sleep(delay).await;
                    delay = (delay + self.delay_increment).min(self.max_delay);
                }
            }
        }
    }
}

//! Bounded retry policy for synchronous probes against the topup provider.
//!
//! The caller of the nickname probe is a human waiting on a form, so the
//! policy is a hard ceiling, not an open-ended backoff: a fixed number of
//! attempts with a fixed pause after every non-terminal result.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

/// Result of one attempt: either the operation reached a terminal state, or
/// the upstream is still processing and another attempt is warranted.
#[derive(Debug)]
pub enum Attempt<T> {
    Terminal(T),
    Transient,
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// Runs `operation` until it reports a terminal result or the attempt
    /// budget is exhausted. Returns `Ok(None)` on exhaustion; errors from the
    /// operation propagate immediately without further attempts.
    ///
    /// Sleeps after every transient attempt, including the last one, matching
    /// the worst-case wall time of `max_attempts * interval`.
    pub async fn run<T, E, F, Fut>(&self, mut operation: F) -> Result<Option<T>, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<Attempt<T>, E>>,
    {
        for attempt in 1..=self.max_attempts {
            match operation(attempt).await? {
                Attempt::Terminal(value) => return Ok(Some(value)),
                Attempt::Transient => sleep(self.interval).await,
            }
        }
        Ok(None)
    }
}

use std::time::Duration;
use tokio_retry::strategy::jitter;

/// Bounded backoff for optimistic commits that lose to a concurrent writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; a call makes at most `max_retries + 1` attempts.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent retry.
    pub base_delay: Duration,
    /// Ceiling on a single delay, applied before jitter.
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay,
        }
    }

    /// Retries without sleeping in between.
    pub fn immediate(max_retries: u32) -> Self {
        Self::new(max_retries, Duration::ZERO, Duration::ZERO)
    }

    /// Backoff ceilings `base_delay * 2^n`, capped at `max_delay`, one per allowed retry.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + use<> {
        let (base_delay, max_delay) = (self.base_delay, self.max_delay);
        (0..self.max_retries).map(move |retry| {
            let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
            base_delay.saturating_mul(factor).min(max_delay)
        })
    }

    /// Jittered `delays`: each sleep is drawn uniformly below its ceiling.
    pub fn strategy(&self) -> impl Iterator<Item = Duration> + use<> {
        self.delays().map(jitter)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(16, Duration::from_millis(5), Duration::from_millis(250))
    }
}

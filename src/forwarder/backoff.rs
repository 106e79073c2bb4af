//! Exponential backoff state machine used by the forwarder.

use std::time::Duration;

use rand::{Rng, SeedableRng, rngs::StdRng};

use super::config::BackoffPolicy;

/// Floor applied to every delay so a down collector never spins the CPU.
pub const MIN_SLEEP: Duration = Duration::from_millis(10);

/// Tracks consecutive failures and produces the delay before the next attempt.
#[derive(Debug)]
pub struct BackoffState {
    policy: BackoffPolicy,
    current: Duration,
    failures: u32,
    rng: StdRng,
}

impl BackoffState {
    pub fn new(policy: BackoffPolicy) -> Self {
        Self {
            current: policy.base,
            failures: 0,
            rng: StdRng::from_entropy(),
            policy,
        }
    }

    /// Forget previous failures after a successful delivery.
    pub fn reset(&mut self) {
        self.current = self.policy.base;
        self.failures = 0;
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.failures
    }

    /// Delay to wait after a failure; doubles on each call up to the cap.
    pub fn next_sleep(&mut self) -> Duration {
        if self.failures > 0 {
            self.current = self.current.saturating_mul(2).min(self.policy.cap);
        }
        self.failures = self.failures.saturating_add(1);

        let window = self.current.min(self.policy.cap).max(MIN_SLEEP);
        if !self.policy.jitter {
            return window;
        }
        let max_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX);
        let min_ms = (max_ms / 2).max(MIN_SLEEP.as_millis() as u64);
        if min_ms >= max_ms {
            return Duration::from_millis(max_ms);
        }
        Duration::from_millis(self.rng.gen_range(min_ms..=max_ms))
    }
}

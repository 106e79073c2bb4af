//! Configuration structures consumed by the syslog forwarder.

use std::time::Duration;

use crate::rate_limited_warner::DEFAULT_WARN_INTERVAL;

/// Timeout applied when dialing the collector.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Read/write deadline applied before every line written.
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(1);
/// Delay before the first retry after a failure.
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_millis(100);
/// Upper bound on the retry delay.
pub const DEFAULT_BACKOFF_CAP: Duration = Duration::from_secs(5);

/// Describes where and how the forwarder ships lines.
#[derive(Clone, Debug)]
pub struct ForwarderConfig {
    /// Collector address as `host:port`.
    pub address: String,
    pub connect_timeout: Duration,
    pub io_timeout: Duration,
    pub backoff: BackoffPolicy,
    /// Minimum interval between summarised connect-failure warnings.
    pub warn_interval: Duration,
}

impl ForwarderConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            io_timeout: DEFAULT_IO_TIMEOUT,
            backoff: BackoffPolicy::default(),
            warn_interval: DEFAULT_WARN_INTERVAL,
        }
    }

    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_timeouts(mut self, connect: Duration, io: Duration) -> Self {
        self.connect_timeout = connect;
        self.io_timeout = io;
        self
    }
}

/// Capped exponential backoff policy for reconnection attempts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub cap: Duration,
    /// Randomise each delay within the upper half of the current window.
    pub jitter: bool,
}

impl BackoffPolicy {
    /// Deterministic policy, mostly useful in tests.
    pub fn fixed_doubling(base: Duration, cap: Duration) -> Self {
        Self {
            base,
            cap,
            jitter: false,
        }
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: DEFAULT_BACKOFF_BASE,
            cap: DEFAULT_BACKOFF_CAP,
            jitter: true,
        }
    }
}

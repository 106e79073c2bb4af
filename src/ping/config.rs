//! Tunables for ping delivery.

use std::time::Duration;

/// Total time allowed for one ping request, connect included.
pub const DEFAULT_PING_TIMEOUT: Duration = Duration::from_secs(1);

/// Pings allowed to run at once before new ones are skipped.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PingConfig {
    pub timeout: Duration,
    pub max_in_flight: usize,
}

impl Default for PingConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_PING_TIMEOUT,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }
}

impl PingConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Cap on concurrent pings; clamped to at least one.
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }
}

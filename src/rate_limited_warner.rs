//! Rate-limited warnings for repeated transport failures.
use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::{Duration, Instant},
};

/// Default minimum interval between summarised warnings.
pub const DEFAULT_WARN_INTERVAL: Duration = Duration::from_secs(5);

const NEVER: u64 = u64::MAX;

/// Helper that rate limits repeated warnings.
///
/// The caller increments the counter via [`record`](Self::record). The next
/// call to [`warn_if_due`](Self::warn_if_due) emits a warning through the
/// provided callback if the interval has elapsed since the previous one. The
/// first warning is emitted immediately. [`flush`](Self::flush) reports any
/// outstanding count regardless of the interval.
///
/// Timestamps are supplied by the caller so the forwarder's injected clock
/// drives the rate limit.
#[derive(Debug)]
pub struct RateLimitedWarner {
    origin: Instant,
    interval: Duration,
    last_warn_ms: AtomicU64,
    pending: AtomicU64,
}

impl RateLimitedWarner {
    pub fn new(origin: Instant, interval: Duration) -> Self {
        Self {
            origin,
            interval,
            last_warn_ms: AtomicU64::new(NEVER),
            pending: AtomicU64::new(0),
        }
    }

    /// Increment the event counter.
    pub fn record(&self) {
        self.pending.fetch_add(1, Ordering::Relaxed);
    }

    /// Emit a warning if the rate limit interval has elapsed.
    pub fn warn_if_due(&self, now: Instant, mut warn: impl FnMut(u64)) {
        let now_ms = self.millis_since_origin(now);
        let prev = self.last_warn_ms.load(Ordering::Relaxed);
        let interval_ms = u64::try_from(self.interval.as_millis()).unwrap_or(u64::MAX);
        if prev != NEVER && now_ms.saturating_sub(prev) < interval_ms {
            return;
        }
        let count = self.pending.swap(0, Ordering::Relaxed);
        if count > 0 {
            warn(count);
            self.last_warn_ms.store(now_ms, Ordering::Relaxed);
        }
    }

    /// Immediately report any outstanding events and re-arm the limiter.
    pub fn flush(&self, mut warn: impl FnMut(u64)) {
        let count = self.pending.swap(0, Ordering::Relaxed);
        if count > 0 {
            warn(count);
        }
        self.last_warn_ms.store(NEVER, Ordering::Relaxed);
    }

    fn millis_since_origin(&self, now: Instant) -> u64 {
        let elapsed = now.saturating_duration_since(self.origin);
        u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX - 1)
    }
}

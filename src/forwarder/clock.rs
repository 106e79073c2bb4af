//! Time source used by the forwarder's retry loop.

use std::{
    thread,
    time::{Duration, Instant},
};

/// Supplies the current instant and blocks between retries.
///
/// Tests substitute a manual clock so backoff sequences run without real
/// delays.
pub trait Clock: Send {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

/// Wall-clock implementation backed by [`std::thread::sleep`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

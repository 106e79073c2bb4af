//! In-memory [`Pinger`] that records every URL it is asked to hit.

use std::{
    collections::HashMap,
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, Sender, bounded};
use parking_lot::Mutex;

use crate::ping::{PingError, Pinger};

#[derive(Default)]
struct Shared {
    calls: Mutex<Vec<String>>,
    failures: Mutex<HashMap<String, PingError>>,
}

/// Records pings, optionally failing chosen URLs or holding every ping until
/// a gate is released.
#[derive(Clone, Default)]
pub struct RecordingPinger {
    shared: Arc<Shared>,
    gate: Option<Receiver<()>>,
}

impl RecordingPinger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pinger whose calls block until the returned sender is dropped.
    pub fn gated() -> (Self, Sender<()>) {
        let (tx, rx) = bounded(0);
        let pinger = Self {
            gate: Some(rx),
            ..Self::default()
        };
        (pinger, tx)
    }

    /// Make pings to `url` fail with `error`.
    pub fn fail_with(self, url: impl Into<String>, error: PingError) -> Self {
        self.shared.failures.lock().insert(url.into(), error);
        self
    }

    /// URLs pinged so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.shared.calls.lock().clone()
    }

    /// Poll until at least `count` pings were recorded or `timeout` passes.
    pub fn wait_for_calls(&self, count: usize, timeout: Duration) -> Vec<String> {
        let deadline = Instant::now() + timeout;
        loop {
            let calls = self.calls();
            if calls.len() >= count || Instant::now() >= deadline {
                return calls;
            }
            thread::sleep(Duration::from_millis(5));
        }
    }
}

impl Pinger for RecordingPinger {
    fn ping(&self, url: &str) -> Result<(), PingError> {
        self.shared.calls.lock().push(url.to_owned());
        if let Some(gate) = &self.gate {
            // Returns once the sender is dropped.
            let _ = gate.recv();
        }
        match self.shared.failures.lock().get(url) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

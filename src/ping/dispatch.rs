//! Detached ping dispatch with a cap on concurrent requests.

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    thread,
};

use log::{debug, error};

use super::{
    client::{HttpPinger, PingError, SharedPinger},
    config::PingConfig,
};

/// What happened to a dispatch request.
#[derive(Debug)]
pub enum Dispatch {
    /// No URL configured; nothing was sent.
    Skipped,
    /// The ping runs on its own thread. Callers normally drop the handle.
    Started(thread::JoinHandle<()>),
    /// The ping was not attempted; the failure callback has already run or
    /// the thread could not be spawned.
    Rejected,
}

/// Fires pings on detached threads, never blocking the caller.
#[derive(Clone)]
pub struct PingDispatcher {
    pinger: SharedPinger,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: usize,
}

/// Releases one in-flight slot when dropped, even if the ping panics.
struct SlotGuard(Arc<AtomicUsize>);

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

impl PingDispatcher {
    /// Dispatcher using [`HttpPinger`] with the configured timeout.
    pub fn new(config: &PingConfig) -> Self {
        Self::with_pinger(Arc::new(HttpPinger::new(config.timeout)), config)
    }

    pub fn with_pinger(pinger: SharedPinger, config: &PingConfig) -> Self {
        Self {
            pinger,
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: config.max_in_flight.max(1),
        }
    }

    /// Pings currently running.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Ping `url` in the background.
    ///
    /// `on_failure` runs at most once with the URL and the reason the ping
    /// failed, either on the ping thread or, when the concurrency cap is
    /// reached, synchronously before this returns. An absent or blank URL is
    /// a no-op.
    pub fn dispatch<F>(&self, url: Option<&str>, on_failure: F) -> Dispatch
    where
        F: FnOnce(&str, PingError) + Send + 'static,
    {
        let Some(url) = url.map(str::trim).filter(|url| !url.is_empty()) else {
            return Dispatch::Skipped;
        };

        let Some(slot) = self.acquire_slot() else {
            on_failure(url, PingError::Saturated(self.max_in_flight));
            return Dispatch::Rejected;
        };

        let pinger = Arc::clone(&self.pinger);
        let owned_url = url.to_owned();
        let spawned = thread::Builder::new()
            .name("ping".into())
            .spawn(move || {
                let _slot = slot;
                match pinger.ping(&owned_url) {
                    Ok(()) => debug!("ping to {owned_url} succeeded"),
                    Err(err) => on_failure(&owned_url, err),
                }
            });
        match spawned {
            Ok(handle) => Dispatch::Started(handle),
            Err(err) => {
                error!("unable to spawn ping thread for {url}: {err}");
                Dispatch::Rejected
            }
        }
    }

    fn acquire_slot(&self) -> Option<SlotGuard> {
        self.in_flight
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (current < self.max_in_flight).then_some(current + 1)
            })
            .ok()
            .map(|_| SlotGuard(Arc::clone(&self.in_flight)))
    }
}

impl std::fmt::Debug for PingDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PingDispatcher")
            .field("in_flight", &self.in_flight())
            .field("max_in_flight", &self.max_in_flight)
            .finish_non_exhaustive()
    }
}

//! Blocking HTTP client used to deliver a single ping.

use std::{sync::Arc, time::Duration};

use thiserror::Error;
use ureq::{Agent, AgentBuilder};

/// Why a ping did not count as delivered.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PingError {
    /// The endpoint answered outside the 2xx range.
    #[error("Expected HTTP 2xx status, got HTTP {0}")]
    Status(u16),
    /// DNS, connect, TLS, timeout or URL parsing failure.
    #[error("{0}")]
    Transport(String),
    /// Too many pings already running; this one was not attempted.
    #[error("{0} pings already in flight, ping skipped")]
    Saturated(usize),
}

/// Performs one ping. Implementations must be callable from many threads.
pub trait Pinger: Send + Sync {
    fn ping(&self, url: &str) -> Result<(), PingError>;
}

/// Thread-safe handle to a pinger, shared by every executor.
pub type SharedPinger = Arc<dyn Pinger>;

/// `true` for statuses a ping treats as delivered.
pub fn classify_status(status: u16) -> bool {
    (200..=299).contains(&status)
}

/// [`Pinger`] backed by a `ureq` agent with an overall request timeout.
#[derive(Clone, Debug)]
pub struct HttpPinger {
    agent: Agent,
}

impl HttpPinger {
    pub fn new(timeout: Duration) -> Self {
        let agent = AgentBuilder::new()
            .timeout(timeout)
            .timeout_connect(timeout)
            .build();
        Self { agent }
    }
}

impl Pinger for HttpPinger {
    fn ping(&self, url: &str) -> Result<(), PingError> {
        match self.agent.get(url).call() {
            Ok(response) if classify_status(response.status()) => Ok(()),
            Ok(response) => Err(PingError::Status(response.status())),
            Err(ureq::Error::Status(code, _)) => Err(PingError::Status(code)),
            Err(ureq::Error::Transport(transport)) => {
                Err(PingError::Transport(transport.to_string()))
            }
        }
    }
}

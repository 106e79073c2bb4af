//! State machine driving delivery to the syslog collector.
//!
//! The forwarder cycles through `Disconnected → Connecting → Streaming` and
//! back on any failure, forever. Each call to [`Forwarder::step`] performs
//! exactly one transition so tests can drive the machine deterministically;
//! [`Forwarder::run`] simply steps in a loop.

use std::{
    io,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    thread,
    time::Duration,
};

use log::{debug, error, info, warn};

use crate::{
    formatter::SharedFormatter, queue::MessageQueue, rate_limited_warner::RateLimitedWarner,
};

use super::{
    backoff::BackoffState,
    clock::{Clock, SystemClock},
    config::ForwarderConfig,
    transport::{Connector, TcpTransport, write_line},
};

/// Observable forwarder state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForwarderState {
    Disconnected,
    Connecting,
    Streaming,
}

enum Phase<C> {
    Disconnected,
    Connecting,
    Streaming(C),
}

/// Delivery counters shared with whoever spawned the forwarder.
#[derive(Debug, Default)]
pub struct ForwarderStats {
    delivered: AtomicU64,
    lost: AtomicU64,
    connect_failures: AtomicU64,
    connections: AtomicU64,
}

impl ForwarderStats {
    /// Lines written to the collector.
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Messages dequeued but never written (at most one per failure).
    pub fn lost(&self) -> u64 {
        self.lost.load(Ordering::Relaxed)
    }

    pub fn connect_failures(&self) -> u64 {
        self.connect_failures.load(Ordering::Relaxed)
    }

    /// Successful dials, including reconnects.
    pub fn connections(&self) -> u64 {
        self.connections.load(Ordering::Relaxed)
    }
}

/// Owns the collector connection and drains the message queue.
pub struct Forwarder<C: Connector = TcpTransport, K: Clock = SystemClock> {
    queue: MessageQueue,
    formatter: SharedFormatter,
    connector: C,
    clock: K,
    connect_timeout: Duration,
    io_timeout: Duration,
    backoff: BackoffState,
    phase: Phase<C::Conn>,
    pending_delay: Option<Duration>,
    stats: Arc<ForwarderStats>,
    warner: RateLimitedWarner,
}

impl Forwarder {
    /// Forwarder shipping over plain TCP to `config.address`.
    pub fn new(queue: MessageQueue, formatter: SharedFormatter, config: ForwarderConfig) -> Self {
        let connector = TcpTransport::new(config.address.clone());
        Self::with_parts(queue, formatter, connector, SystemClock, config)
    }
}

impl<C: Connector, K: Clock> Forwarder<C, K> {
    /// Assemble a forwarder from explicit transport and clock implementations.
    pub fn with_parts(
        queue: MessageQueue,
        formatter: SharedFormatter,
        connector: C,
        clock: K,
        config: ForwarderConfig,
    ) -> Self {
        let warner = RateLimitedWarner::new(clock.now(), config.warn_interval);
        Self {
            queue,
            formatter,
            connector,
            clock,
            connect_timeout: config.connect_timeout,
            io_timeout: config.io_timeout,
            backoff: BackoffState::new(config.backoff),
            phase: Phase::Disconnected,
            pending_delay: None,
            stats: Arc::default(),
            warner,
        }
    }

    pub fn state(&self) -> ForwarderState {
        match self.phase {
            Phase::Disconnected => ForwarderState::Disconnected,
            Phase::Connecting => ForwarderState::Connecting,
            Phase::Streaming(_) => ForwarderState::Streaming,
        }
    }

    pub fn stats(&self) -> Arc<ForwarderStats> {
        Arc::clone(&self.stats)
    }

    /// Perform one state transition and return the new state.
    ///
    /// In `Streaming` this blocks until a message is available.
    pub fn step(&mut self) -> ForwarderState {
        let phase = std::mem::replace(&mut self.phase, Phase::Disconnected);
        self.phase = match phase {
            Phase::Disconnected => {
                if let Some(delay) = self.pending_delay.take() {
                    debug!("syslog forwarder retrying in {delay:?}");
                    self.clock.sleep(delay);
                }
                Phase::Connecting
            }
            Phase::Connecting => self.connect(),
            Phase::Streaming(conn) => self.forward_one(conn),
        };
        self.state()
    }

    /// Deliver messages until the process exits. Never returns.
    pub fn run(mut self) {
        info!("syslog forwarder shipping to {}", self.connector.target());
        loop {
            self.step();
        }
    }

    /// Run the forwarder on a dedicated named thread.
    pub fn spawn(self) -> io::Result<thread::JoinHandle<()>>
    where
        C: 'static,
        K: 'static,
    {
        thread::Builder::new()
            .name("syslog-forwarder".into())
            .spawn(move || self.run())
    }

    fn connect(&mut self) -> Phase<C::Conn> {
        match self.connector.connect(self.connect_timeout) {
            Ok(conn) => {
                self.stats.connections.fetch_add(1, Ordering::Relaxed);
                let target = self.connector.target();
                self.warner.flush(|count| {
                    warn!("syslog forwarder: {count} further connection attempts to {target} failed");
                });
                info!("syslog forwarder connected to {target}");
                Phase::Streaming(conn)
            }
            Err(err) => {
                self.stats.connect_failures.fetch_add(1, Ordering::Relaxed);
                self.warner.record();
                let target = self.connector.target();
                self.warner.warn_if_due(self.clock.now(), |count| {
                    warn!("syslog forwarder: unable to connect to {target} ({count} attempts): {err}");
                });
                self.fail()
            }
        }
    }

    fn forward_one(&mut self, mut conn: C::Conn) -> Phase<C::Conn> {
        let message = match self.queue.dequeue_blocking() {
            Ok(message) => message,
            Err(err) => {
                error!("syslog forwarder: {err}; no messages can be delivered");
                return self.fail();
            }
        };

        let line = match self.formatter.format(&message) {
            Ok(line) => line,
            Err(err) => {
                self.stats.lost.fetch_add(1, Ordering::Relaxed);
                error!(
                    "syslog forwarder: cannot format ({message}): {err}; \
                     check log_template, every message will fail the same way"
                );
                return self.fail();
            }
        };

        match write_line(&mut conn, line.as_bytes(), self.io_timeout) {
            Ok(()) => {
                self.stats.delivered.fetch_add(1, Ordering::Relaxed);
                self.backoff.reset();
                Phase::Streaming(conn)
            }
            Err(err) => {
                self.stats.lost.fetch_add(1, Ordering::Relaxed);
                warn!(
                    "syslog forwarder: write to {} failed, dropped ({message}): {err}",
                    self.connector.target()
                );
                self.fail()
            }
        }
    }

    /// Tear down any connection and schedule the next attempt.
    fn fail(&mut self) -> Phase<C::Conn> {
        self.pending_delay = Some(self.backoff.next_sleep());
        Phase::Disconnected
    }
}

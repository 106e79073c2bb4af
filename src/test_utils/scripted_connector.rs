//! Connector whose dial and write outcomes are scripted by the test.

use std::{
    collections::VecDeque,
    io::{self, Write},
    sync::Arc,
    time::Duration,
};

use parking_lot::Mutex;

use crate::forwarder::{Connection, Connector};

/// Outcome of one dial attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectStep {
    /// The dial fails with `ConnectionRefused`.
    Refuse,
    /// The dial succeeds; the zero-based write `fail_on_write` (if any) on
    /// this connection fails with `BrokenPipe`.
    Accept { fail_on_write: Option<usize> },
}

/// Replays [`ConnectStep`]s in order, accepting cleanly once the script is
/// exhausted. Every successfully written line is collected in one shared log.
#[derive(Clone, Debug, Default)]
pub struct ScriptedConnector {
    script: Arc<Mutex<VecDeque<ConnectStep>>>,
    written: Arc<Mutex<Vec<String>>>,
    io_timeouts: Arc<Mutex<Vec<Duration>>>,
    connect_timeouts: Arc<Mutex<Vec<Duration>>>,
}

impl ScriptedConnector {
    pub fn new(script: impl IntoIterator<Item = ConnectStep>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into_iter().collect())),
            ..Self::default()
        }
    }

    /// Lines received across all connections, in write order.
    pub fn written(&self) -> Vec<String> {
        self.written.lock().clone()
    }

    pub fn attempts(&self) -> usize {
        self.connect_timeouts.lock().len()
    }

    /// Dial timeouts passed by the forwarder, one per connect attempt.
    pub fn connect_timeouts(&self) -> Vec<Duration> {
        self.connect_timeouts.lock().clone()
    }

    /// Deadlines applied by the forwarder, one per write attempt.
    pub fn io_timeouts(&self) -> Vec<Duration> {
        self.io_timeouts.lock().clone()
    }
}

impl Connector for ScriptedConnector {
    type Conn = ScriptedConnection;

    fn connect(&mut self, timeout: Duration) -> io::Result<ScriptedConnection> {
        self.connect_timeouts.lock().push(timeout);
        let step = self
            .script
            .lock()
            .pop_front()
            .unwrap_or(ConnectStep::Accept { fail_on_write: None });
        match step {
            ConnectStep::Refuse => Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "scripted refusal",
            )),
            ConnectStep::Accept { fail_on_write } => Ok(ScriptedConnection {
                written: Arc::clone(&self.written),
                io_timeouts: Arc::clone(&self.io_timeouts),
                writes: 0,
                fail_on_write,
            }),
        }
    }

    fn target(&self) -> &str {
        "scripted"
    }
}

/// Connection handed out by [`ScriptedConnector`].
#[derive(Debug)]
pub struct ScriptedConnection {
    written: Arc<Mutex<Vec<String>>>,
    io_timeouts: Arc<Mutex<Vec<Duration>>>,
    writes: usize,
    fail_on_write: Option<usize>,
}

impl Write for ScriptedConnection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let index = self.writes;
        self.writes += 1;
        if self.fail_on_write == Some(index) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "scripted write failure"));
        }
        self.written
            .lock()
            .push(String::from_utf8_lossy(buf).into_owned());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Connection for ScriptedConnection {
    fn set_io_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        self.io_timeouts.lock().push(timeout);
        Ok(())
    }
}

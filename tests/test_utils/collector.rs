//! Minimal syslog collector for end-to-end tests.
//!
//! Accepts connections one after another on an ephemeral localhost port and
//! forwards every received line, without its line feed, to a channel.

use std::{
    io::{BufRead, BufReader},
    net::{SocketAddr, TcpListener},
    sync::mpsc,
    thread,
    time::{Duration, Instant},
};

pub struct Collector {
    addr: SocketAddr,
    lines: mpsc::Receiver<String>,
}

impl Collector {
    pub fn start() -> Self {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind collector");
        let addr = listener.local_addr().expect("collector address");
        let (tx, lines) = mpsc::channel();
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                for line in BufReader::new(stream).lines() {
                    let Ok(line) = line else { break };
                    if tx.send(line).is_err() {
                        return;
                    }
                }
            }
        });
        Self { addr, lines }
    }

    pub fn address(&self) -> String {
        self.addr.to_string()
    }

    /// Collect lines until one satisfies `done` or `timeout` elapses.
    pub fn lines_until(&self, timeout: Duration, done: impl Fn(&str) -> bool) -> Vec<String> {
        let deadline = Instant::now() + timeout;
        let mut seen = Vec::new();
        while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
            match self.lines.recv_timeout(remaining) {
                Ok(line) => {
                    let finished = done(&line);
                    seen.push(line);
                    if finished {
                        return seen;
                    }
                }
                Err(_) => break,
            }
        }
        panic!("collector timed out; received {seen:?}");
    }
}

//! Test doubles shared by unit tests and, through the `test-util` feature,
//! by the integration tests under `tests/`.
//!
//! These replace the wall clock, the TCP collector and the HTTP ping client
//! so the forwarder and executor can be exercised deterministically.

mod manual_clock;
mod recording_pinger;
mod scripted_connector;

pub use manual_clock::ManualClock;
pub use recording_pinger::RecordingPinger;
pub use scripted_connector::{ConnectStep, ScriptedConnection, ScriptedConnector};

use crate::{message::Message, queue::MessageQueue};

/// Remove every message currently queued, oldest first.
pub fn drain_queue(queue: &MessageQueue) -> Vec<Message> {
    let mut out = Vec::with_capacity(queue.len());
    while !queue.is_empty() {
        match queue.dequeue_blocking() {
            Ok(message) => out.push(message),
            Err(_) => break,
        }
    }
    out
}

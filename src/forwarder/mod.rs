//! Syslog forwarder: the single consumer of the message queue.
//!
//! This module defines [`Forwarder`], which owns the TCP connection to the
//! remote collector. It dequeues messages, renders them through a
//! [`SharedFormatter`](crate::formatter::SharedFormatter) and writes one line
//! per message under a fixed deadline. Any failure closes the connection and
//! the forwarder reconnects after a capped exponential backoff. Delivery is
//! at-most-once: a message dequeued but not written when the connection fails
//! is dropped and counted in [`ForwarderStats::lost`].

mod backoff;
mod clock;
mod config;
mod transport;
mod worker;


pub use backoff::{BackoffState, MIN_SLEEP};
pub use clock::{Clock, SystemClock};
pub use config::{
    BackoffPolicy, DEFAULT_BACKOFF_BASE, DEFAULT_BACKOFF_CAP, DEFAULT_CONNECT_TIMEOUT,
    DEFAULT_IO_TIMEOUT, ForwarderConfig,
};
pub use transport::{Connection, Connector, TcpTransport};
pub use worker::{Forwarder, ForwarderState, ForwarderStats};

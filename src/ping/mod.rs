//! HTTP ping notifications fired when a job finishes.
//!
//! A ping is a single `GET` whose response status decides success. Dispatch
//! is detached: the executor never waits on a ping, and failures surface only
//! as error messages in the job's syslog stream.

mod client;
mod config;
mod dispatch;


pub use client::{HttpPinger, PingError, Pinger, SharedPinger, classify_status};
pub use config::{DEFAULT_MAX_IN_FLIGHT, DEFAULT_PING_TIMEOUT, PingConfig};
pub use dispatch::{Dispatch, PingDispatcher};

//! Run commands on a cron schedule and ship their output to syslog.
//!
//! Job output flows `executor → reassembler → queue → forwarder → TCP`.
//! Everything upstream of the queue runs on job threads; the single
//! [`Forwarder`] owns the collector connection and survives collector
//! outages by reconnecting with capped exponential backoff.

pub mod config;
pub mod duration;
pub mod executor;
pub mod formatter;
pub mod forwarder;
pub mod message;
pub mod ping;
pub mod queue;
pub mod rate_limited_warner;
pub mod reassembler;
pub mod scheduler;
pub mod severity;

#[cfg(any(test, feature = "test-util"))]
pub mod test_utils;

pub use config::{Config, ConfigError, DEFAULT_CONFIG_PATH};
pub use executor::{JobExecutor, JobOutcome, JobSpec};
pub use formatter::{
    DEFAULT_TEMPLATE, FormatError, LogTemplate, MessageFormatter, SharedFormatter,
    SyslogFormatter, format_message,
};
pub use forwarder::{BackoffPolicy, Forwarder, ForwarderConfig, ForwarderState, ForwarderStats};
pub use message::Message;
pub use ping::{HttpPinger, PingConfig, PingDispatcher, PingError, Pinger};
pub use queue::{DEFAULT_QUEUE_CAPACITY, MessageQueue, QueueError};
pub use reassembler::LineReassembler;
pub use scheduler::{CronScheduler, JobCallback, JobSchedule, ScheduleError, Scheduler};
pub use severity::Severity;

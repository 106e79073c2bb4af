//! Captured job output lines travelling through the shipping pipeline.
//!
//! A [`Message`] is created once by a producer (a line reassembler or the job
//! executor), moved into the shared queue and consumed exactly once by the
//! syslog forwarder. It exposes read-only accessors so nothing downstream can
//! alter it after capture.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local};

use crate::severity::Severity;

/// One severity-tagged line of job output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    timestamp: DateTime<Local>,
    job_name: Arc<str>,
    text: String,
    severity: Severity,
}

impl Message {
    /// Capture a message stamped with the current local time.
    pub fn new(job_name: impl Into<Arc<str>>, severity: Severity, text: impl Into<String>) -> Self {
        Self::with_timestamp(Local::now(), job_name, severity, text)
    }

    /// Construct a message with an explicit capture time.
    pub fn with_timestamp(
        timestamp: DateTime<Local>,
        job_name: impl Into<Arc<str>>,
        severity: Severity,
        text: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            job_name: job_name.into(),
            text: text.into(),
            severity,
        }
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.job_name, self.severity, self.text)
    }
}

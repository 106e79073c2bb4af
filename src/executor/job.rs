//! Job definitions as they appear in the configuration file.

use serde::Deserialize;

/// One scheduled command.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct JobSpec {
    /// Name shown as the syslog tag.
    pub name: String,
    /// Cron expression understood by the scheduler.
    pub schedule: String,
    #[serde(rename = "cmd")]
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub ping_success: Option<String>,
    #[serde(default)]
    pub ping_failure: Option<String>,
}

impl JobSpec {
    pub fn new(
        name: impl Into<String>,
        schedule: impl Into<String>,
        command: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            schedule: schedule.into(),
            command: command.into(),
            args: Vec::new(),
            ping_success: None,
            ping_failure: None,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_ping_success(mut self, url: impl Into<String>) -> Self {
        self.ping_success = Some(url.into());
        self
    }

    pub fn with_ping_failure(mut self, url: impl Into<String>) -> Self {
        self.ping_failure = Some(url.into());
        self
    }
}

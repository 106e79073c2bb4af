//! YAML configuration file describing the collector and the jobs to run.
//!
//! ```yaml
//! rsyslog_target: logs.example.com:514
//! log_template: "<{priority}>{timestamp} {hostname} {job}: {message}"
//! jobs:
//!   - name: backup
//!     schedule: "0 0 3 * * *"
//!     cmd: /usr/local/bin/backup
//!     args: ["--full"]
//!     ping_success: https://hc.example/ping/abc
//!     ping_failure: https://hc.example/ping/abc/fail
//! ```
//!
//! Everything is validated by [`Config::load`]; a config that loads is safe to
//! start from.

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::Deserialize;
use thiserror::Error;

use crate::{
    executor::JobSpec,
    formatter::{DEFAULT_TEMPLATE, FormatError, LogTemplate},
    scheduler::{ScheduleError, parse_schedule},
};

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Reasons a configuration cannot be used. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("rsyslog_target must be set to host:port")]
    MissingTarget,
    #[error("job #{index} has no name")]
    UnnamedJob { index: usize },
    #[error("job {job:?} has no cmd")]
    MissingCommand { job: String },
    #[error("unable to add job {job:?}: {source}")]
    Schedule {
        job: String,
        #[source]
        source: ScheduleError,
    },
    #[error("invalid log_template: {0}")]
    Template(#[from] FormatError),
}

/// Parsed contents of the configuration file.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// `host:port` of the syslog collector.
    #[serde(default)]
    pub rsyslog_target: String,
    /// Wire line template; absent or blank means [`DEFAULT_TEMPLATE`].
    #[serde(default)]
    pub log_template: Option<String>,
    #[serde(default)]
    pub jobs: Vec<JobSpec>,
}

impl Config {
    /// Read, parse and validate `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let body = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        body.parse()
    }

    /// Template source after applying the default.
    pub fn template_source(&self) -> &str {
        self.log_template
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(DEFAULT_TEMPLATE)
    }

    pub fn template(&self) -> Result<LogTemplate, FormatError> {
        LogTemplate::parse(self.template_source())
    }

    /// Check everything that would otherwise fail after startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rsyslog_target.trim().is_empty() {
            return Err(ConfigError::MissingTarget);
        }
        self.template()?;
        for (index, job) in self.jobs.iter().enumerate() {
            if job.name.trim().is_empty() {
                return Err(ConfigError::UnnamedJob { index });
            }
            if job.command.trim().is_empty() {
                return Err(ConfigError::MissingCommand {
                    job: job.name.clone(),
                });
            }
            parse_schedule(&job.schedule).map_err(|source| ConfigError::Schedule {
                job: job.name.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    /// Parse and validate YAML text.
    fn from_str(body: &str) -> Result<Self, Self::Err> {
        let config: Config = serde_yaml::from_str(body)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod config_tests;

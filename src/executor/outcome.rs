//! Classification of a finished job run.

use std::{fmt, process::ExitStatus};

use crate::severity::Severity;

use super::SYSTEM_PREFIX;

/// How a job run ended. Exactly one outcome is reported per run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobOutcome {
    /// The process exited with code 0.
    Success,
    /// The process ran but exited non-zero. `code` is `None` when it was
    /// killed by a signal.
    UnexpectedExit {
        code: Option<i32>,
        signal: Option<i32>,
    },
    /// The process could not be started or waited on.
    ExecutionError(String),
}

impl JobOutcome {
    pub fn from_status(status: ExitStatus) -> Self {
        if status.success() {
            return Self::Success;
        }
        Self::UnexpectedExit {
            code: status.code(),
            signal: exit_signal(status),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Severity of the summary line.
    pub fn severity(&self) -> Severity {
        if self.is_success() {
            Severity::Info
        } else {
            Severity::Error
        }
    }
}

#[cfg(unix)]
fn exit_signal(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: ExitStatus) -> Option<i32> {
    None
}

/// Renders the summary line sent to the collector.
impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "{SYSTEM_PREFIX} Command execution successful"),
            Self::UnexpectedExit {
                code: Some(code), ..
            } => write!(
                f,
                "{SYSTEM_PREFIX} Command exited with unexpected exit code {code}"
            ),
            Self::UnexpectedExit {
                code: None,
                signal: Some(signal),
            } => write!(
                f,
                "{SYSTEM_PREFIX} Command exited with unexpected exit code (killed by signal {signal})"
            ),
            Self::UnexpectedExit {
                code: None,
                signal: None,
            } => write!(
                f,
                "{SYSTEM_PREFIX} Command exited with unexpected exit code (unknown)"
            ),
            Self::ExecutionError(err) => write!(f, "{SYSTEM_PREFIX} Execution caused error: {err}"),
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::os::unix::process::ExitStatusExt;

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn zero_status_is_success() {
        let outcome = JobOutcome::from_status(ExitStatus::from_raw(0));
        assert_eq!(outcome, JobOutcome::Success);
        assert_eq!(outcome.severity(), Severity::Info);
        assert_eq!(outcome.to_string(), "[SYS] Command execution successful");
    }

    #[rstest]
    fn non_zero_status_keeps_code() {
        let outcome = JobOutcome::from_status(ExitStatus::from_raw(17 << 8));
        assert_eq!(
            outcome,
            JobOutcome::UnexpectedExit {
                code: Some(17),
                signal: None
            }
        );
        assert_eq!(outcome.severity(), Severity::Error);
        assert_eq!(
            outcome.to_string(),
            "[SYS] Command exited with unexpected exit code 17"
        );
    }

    #[rstest]
    fn signal_is_reported_without_code() {
        let outcome = JobOutcome::from_status(ExitStatus::from_raw(9));
        assert_eq!(
            outcome,
            JobOutcome::UnexpectedExit {
                code: None,
                signal: Some(9)
            }
        );
        assert!(outcome.to_string().ends_with("(killed by signal 9)"));
    }

    #[rstest]
    fn execution_error_carries_cause() {
        let outcome = JobOutcome::ExecutionError("No such file or directory".into());
        assert!(!outcome.is_success());
        assert_eq!(
            outcome.to_string(),
            "[SYS] Execution caused error: No such file or directory"
        );
    }
}

//! Syslog severities attached to captured job output.

use std::fmt;

/// Syslog facility used for every message (`local0`).
pub const FACILITY_LOCAL0: u8 = 16;

/// RFC 3164 severity levels.
///
/// Job stdout is tagged [`Severity::Info`] and stderr [`Severity::Error`].
/// The other levels complete the RFC 3164 range for custom formatters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Emergency,
    Alert,
    Critical,
    Error,
    Warning,
    Notice,
    #[default]
    Info,
    Debug,
}

impl Severity {
    /// Numeric severity code as used on the wire.
    pub const fn code(self) -> u8 {
        match self {
            Severity::Emergency => 0,
            Severity::Alert => 1,
            Severity::Critical => 2,
            Severity::Error => 3,
            Severity::Warning => 4,
            Severity::Notice => 5,
            Severity::Info => 6,
            Severity::Debug => 7,
        }
    }

    /// Syslog priority value: `facility * 8 + severity` with facility `local0`.
    pub const fn priority(self) -> u8 {
        FACILITY_LOCAL0 * 8 + self.code()
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Emergency => "EMERG",
            Severity::Alert => "ALERT",
            Severity::Critical => "CRIT",
            Severity::Error => "ERR",
            Severity::Warning => "WARNING",
            Severity::Notice => "NOTICE",
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Severity::Info, 134)]
    #[case(Severity::Error, 131)]
    #[case(Severity::Emergency, 128)]
    #[case(Severity::Debug, 135)]
    fn priority_uses_local0_facility(#[case] severity: Severity, #[case] expected: u8) {
        assert_eq!(severity.priority(), expected);
    }
}

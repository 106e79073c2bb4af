//! Formatter implementations turning messages into syslog wire lines.
//!
//! Provides the core [`MessageFormatter`] trait alongside the template-driven
//! [`SyslogFormatter`]. Templates are parsed once at startup via
//! [`LogTemplate::parse`]; a malformed template is a configuration error and
//! never reaches the forwarder.

use std::{fmt, sync::Arc};

use thiserror::Error;

use crate::message::Message;

mod template;

pub use template::{DEFAULT_TEMPLATE, LogTemplate, Placeholder, SyslogFormatter, format_message};

/// Errors raised while parsing or rendering a log template.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("log template is empty")]
    Empty,
    #[error("unterminated placeholder starting at byte {0}")]
    Unterminated(usize),
    #[error("unmatched '}}' at byte {0}; write '}}}}' for a literal brace")]
    UnmatchedBrace(usize),
    #[error("unknown placeholder {{{0}}}")]
    UnknownPlaceholder(String),
    #[error("log template must not contain line terminators")]
    LineTerminator,
    /// Rendering failed for a specific message.
    #[error("failed to render message: {0}")]
    Render(String),
}

/// Trait for rendering messages into wire lines.
///
/// Implementors return the complete line including its single trailing line
/// feed. They must be thread-safe (`Send + Sync`) so one formatter can be
/// shared between the forwarder and diagnostics.
pub trait MessageFormatter: Send + Sync {
    fn format(&self, message: &Message) -> Result<String, FormatError>;
}

/// Shared formatter trait object handed to the forwarder.
#[derive(Clone)]
pub struct SharedFormatter {
    inner: Arc<dyn MessageFormatter>,
}

impl SharedFormatter {
    /// Create a shared formatter from an owned formatter implementation.
    pub fn new<F>(formatter: F) -> Self
    where
        F: MessageFormatter + 'static,
    {
        Self {
            inner: Arc::new(formatter),
        }
    }

    pub fn format(&self, message: &Message) -> Result<String, FormatError> {
        self.inner.format(message)
    }
}

impl fmt::Debug for SharedFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedFormatter(<dyn MessageFormatter>)")
    }
}

impl MessageFormatter for Arc<dyn MessageFormatter> {
    fn format(&self, message: &Message) -> Result<String, FormatError> {
        (**self).format(message)
    }
}

impl MessageFormatter for Box<dyn MessageFormatter> {
    fn format(&self, message: &Message) -> Result<String, FormatError> {
        (**self).format(message)
    }
}

//! Placeholder templates for syslog lines.

use std::fmt::Write as _;

use super::{FormatError, MessageFormatter};
use crate::message::Message;

/// RFC 3164 style line: `<PRI>TIMESTAMP HOSTNAME JOB: TEXT`.
pub const DEFAULT_TEMPLATE: &str = "<{priority}>{timestamp} {hostname} {job}: {message}";

/// `Mon DD HH:MM:SS`, local time, no year.
const TIMESTAMP_FORMAT: &str = "%b %d %H:%M:%S";

/// Named substitutions available inside `{...}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placeholder {
    /// `facility * 8 + severity` with facility `local0`.
    Priority,
    Timestamp,
    Hostname,
    Job,
    /// Numeric severity code.
    Severity,
    Message,
}

impl Placeholder {
    pub const ALL: [Placeholder; 6] = [
        Placeholder::Priority,
        Placeholder::Timestamp,
        Placeholder::Hostname,
        Placeholder::Job,
        Placeholder::Severity,
        Placeholder::Message,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Placeholder::Priority => "priority",
            Placeholder::Timestamp => "timestamp",
            Placeholder::Hostname => "hostname",
            Placeholder::Job => "job",
            Placeholder::Severity => "severity",
            Placeholder::Message => "message",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    fn render(self, out: &mut String, message: &Message, hostname: &str) -> std::fmt::Result {
        match self {
            Placeholder::Priority => write!(out, "{}", message.severity().priority()),
            Placeholder::Timestamp => {
                write!(out, "{}", message.timestamp().format(TIMESTAMP_FORMAT))
            }
            Placeholder::Hostname => {
                out.push_str(hostname);
                Ok(())
            }
            Placeholder::Job => {
                out.push_str(message.job_name());
                Ok(())
            }
            Placeholder::Severity => write!(out, "{}", message.severity().code()),
            Placeholder::Message => {
                out.push_str(message.text());
                Ok(())
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Placeholder),
}

/// A parsed log template.
///
/// Placeholders are written `{name}`; `{{` and `}}` produce literal braces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogTemplate {
    segments: Vec<Segment>,
}

impl LogTemplate {
    pub fn parse(source: &str) -> Result<Self, FormatError> {
        if source.is_empty() {
            return Err(FormatError::Empty);
        }
        if source.contains(['\n', '\r']) {
            return Err(FormatError::LineTerminator);
        }

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((pos, ch)) = chars.next() {
            match ch {
                '{' if chars.peek().map(|(_, c)| *c) == Some('{') => {
                    chars.next();
                    literal.push('{');
                }
                '{' => {
                    let start = pos + 1;
                    let end = source[start..]
                        .find('}')
                        .map(|i| start + i)
                        .ok_or(FormatError::Unterminated(pos))?;
                    let name = &source[start..end];
                    let field = Placeholder::from_name(name)
                        .ok_or_else(|| FormatError::UnknownPlaceholder(name.to_owned()))?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field(field));
                    while chars.next_if(|(i, _)| *i <= end).is_some() {}
                }
                '}' if chars.peek().map(|(_, c)| *c) == Some('}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => return Err(FormatError::UnmatchedBrace(pos)),
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self { segments })
    }

    /// Placeholders referenced by the template, in order of appearance.
    pub fn placeholders(&self) -> impl Iterator<Item = Placeholder> + '_ {
        self.segments.iter().filter_map(|s| match s {
            Segment::Field(p) => Some(*p),
            Segment::Literal(_) => None,
        })
    }

    /// Render `message` followed by a single line feed.
    pub fn render(&self, message: &Message, hostname: &str) -> Result<String, FormatError> {
        let mut out = String::with_capacity(64 + message.text().len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(field) => field
                    .render(&mut out, message, hostname)
                    .map_err(|err| FormatError::Render(err.to_string()))?,
            }
        }
        out.push('\n');
        Ok(out)
    }
}

impl Default for LogTemplate {
    fn default() -> Self {
        Self {
            segments: vec![
                Segment::Literal("<".into()),
                Segment::Field(Placeholder::Priority),
                Segment::Literal(">".into()),
                Segment::Field(Placeholder::Timestamp),
                Segment::Literal(" ".into()),
                Segment::Field(Placeholder::Hostname),
                Segment::Literal(" ".into()),
                Segment::Field(Placeholder::Job),
                Segment::Literal(": ".into()),
                Segment::Field(Placeholder::Message),
            ],
        }
    }
}

/// Template formatter bound to the hostname reported on every line.
#[derive(Clone, Debug)]
pub struct SyslogFormatter {
    template: LogTemplate,
    hostname: String,
}

impl SyslogFormatter {
    pub fn new(template: LogTemplate, hostname: impl Into<String>) -> Self {
        Self {
            template,
            hostname: hostname.into(),
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }
}

impl MessageFormatter for SyslogFormatter {
    fn format(&self, message: &Message) -> Result<String, FormatError> {
        self.template.render(message, &self.hostname)
    }
}

/// Parse `template` and render a single message in one step.
pub fn format_message(
    message: &Message,
    hostname: &str,
    template: &str,
) -> Result<String, FormatError> {
    LogTemplate::parse(template)?.render(message, hostname)
}

#[cfg(test)]
mod tests {
    use chrono::{Local, TimeZone};
    use rstest::{fixture, rstest};

    use super::*;
    use crate::severity::Severity;

    #[fixture]
    fn oops() -> Message {
        let at = Local
            .with_ymd_and_hms(2024, 1, 2, 3, 4, 5)
            .single()
            .expect("unambiguous local time");
        Message::with_timestamp(at, "job1", Severity::Error, "oops")
    }

    #[rstest]
    fn default_template_renders_rfc3164_line(oops: Message) {
        let line = format_message(&oops, "h", DEFAULT_TEMPLATE).expect("format");
        assert_eq!(line, "<131>Jan 02 03:04:05 h job1: oops\n");
    }

    #[rstest]
    fn parsed_default_matches_builtin_default() {
        assert_eq!(
            LogTemplate::parse(DEFAULT_TEMPLATE).expect("parse"),
            LogTemplate::default()
        );
    }

    #[rstest]
    fn info_lines_use_priority_134(oops: Message) {
        let info = Message::with_timestamp(oops.timestamp(), "job1", Severity::Info, "ok");
        let line = format_message(&info, "h", "{priority}/{severity}").expect("format");
        assert_eq!(line, "134/6\n");
    }

    #[rstest]
    fn escaped_braces_are_literal(oops: Message) {
        let line = format_message(&oops, "h", "{{{job}}} }}x{{").expect("format");
        assert_eq!(line, "{job1} }x{\n");
    }

    #[rstest]
    #[case::empty("", FormatError::Empty)]
    #[case::unterminated("<{priority", FormatError::Unterminated(1))]
    #[case::stray_close("job}", FormatError::UnmatchedBrace(3))]
    #[case::unknown("{date}", FormatError::UnknownPlaceholder("date".into()))]
    #[case::empty_name("{}", FormatError::UnknownPlaceholder(String::new()))]
    #[case::newline("{message}\n", FormatError::LineTerminator)]
    fn malformed_templates_are_rejected(#[case] source: &str, #[case] expected: FormatError) {
        assert_eq!(LogTemplate::parse(source), Err(expected));
    }

    #[rstest]
    fn placeholders_are_listed_in_order() {
        let template = LogTemplate::parse("{job} {message} {job}").expect("parse");
        let names: Vec<_> = template.placeholders().map(Placeholder::name).collect();
        assert_eq!(names, vec!["job", "message", "job"]);
    }

    #[rstest]
    fn syslog_formatter_uses_bound_hostname(oops: Message) {
        let formatter = SyslogFormatter::new(LogTemplate::default(), "web-01");
        let line = formatter.format(&oops).expect("format");
        assert!(line.contains(" web-01 job1: oops"), "{line}");
        assert!(line.ends_with('\n') && !line.ends_with("\n\n"));
    }
}

//! Byte-stream to line reassembly for captured process output.
//!
//! [`LineReassembler`] implements [`std::io::Write`] so it can sit directly
//! behind a child process pipe. Bytes are buffered until a line feed arrives;
//! every complete line becomes one [`Message`] on the shared queue and the
//! trailing fragment stays buffered for the next write.

use std::{
    io::{self, Write},
    sync::Arc,
};

use crate::{
    message::Message,
    queue::{MessageQueue, QueueError},
    severity::Severity,
};

const LINE_FEED: u8 = b'\n';

/// Splits written bytes into lines and enqueues one message per line.
///
/// The buffer never holds a line feed between calls. A process that never
/// writes a newline grows the buffer without bound.
#[derive(Debug)]
pub struct LineReassembler {
    job_name: Arc<str>,
    severity: Severity,
    queue: MessageQueue,
    buffer: Vec<u8>,
}

impl LineReassembler {
    pub fn new(job_name: impl Into<Arc<str>>, severity: Severity, queue: MessageQueue) -> Self {
        Self {
            job_name: job_name.into(),
            severity,
            queue,
            buffer: Vec::new(),
        }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Bytes received after the last line feed.
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    /// Emit any buffered fragment as a final message.
    ///
    /// Called once the underlying stream reaches EOF so output without a
    /// trailing newline is not discarded. Does nothing when the buffer is
    /// empty.
    pub fn finish(&mut self) -> io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let rest = std::mem::take(&mut self.buffer);
        self.emit(&rest)
    }

    fn emit(&self, line: &[u8]) -> io::Result<()> {
        let text = String::from_utf8_lossy(line).into_owned();
        self.queue
            .enqueue(Message::new(Arc::clone(&self.job_name), self.severity, text))
            .map_err(|err: QueueError| io::Error::new(io::ErrorKind::BrokenPipe, err))
    }
}

impl Write for LineReassembler {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let scan_from = self.buffer.len();
        self.buffer.extend_from_slice(buf);

        let Some(offset) = self.buffer[scan_from..]
            .iter()
            .rposition(|b| *b == LINE_FEED)
        else {
            return Ok(buf.len());
        };

        let complete: Vec<u8> = self.buffer.drain(..=scan_from + offset).collect();
        let body = &complete[..complete.len() - 1];
        for line in body.split(|b| *b == LINE_FEED) {
            self.emit(line)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn queue() -> MessageQueue {
        MessageQueue::bounded(64)
    }

    fn drain(queue: &MessageQueue) -> Vec<String> {
        let mut out = Vec::new();
        while !queue.is_empty() {
            out.push(queue.dequeue_blocking().expect("dequeue").text().to_owned());
        }
        out
    }

    #[rstest]
    fn split_writes_emit_lines_in_order(queue: MessageQueue) {
        let mut writer = LineReassembler::new("job1", Severity::Info, queue.clone());
        assert_eq!(writer.write(b"a\n").expect("write"), 2);
        assert_eq!(writer.write(b"b\n").expect("write"), 2);
        assert_eq!(drain(&queue), vec!["a", "b"]);
        assert!(writer.pending().is_empty());
    }

    #[rstest]
    fn partial_line_waits_for_delimiter(queue: MessageQueue) {
        let mut writer = LineReassembler::new("job1", Severity::Info, queue.clone());
        writer.write_all(b"hel").expect("write");
        writer.write_all(b"lo").expect("write");
        assert!(queue.is_empty());
        assert_eq!(writer.pending(), b"hello");

        writer.write_all(b" world\nnext").expect("write");
        assert_eq!(drain(&queue), vec!["hello world"]);
        assert_eq!(writer.pending(), b"next");
    }

    #[rstest]
    #[case::single_newline("\n", vec![""])]
    #[case::blank_lines("a\n\nb\n", vec!["a", "", "b"])]
    #[case::no_delimiter("abc", vec![])]
    #[case::carriage_return_kept("dos\r\n", vec!["dos\r"])]
    fn splits_exactly_on_line_feed(
        queue: MessageQueue,
        #[case] input: &str,
        #[case] expected: Vec<&str>,
    ) {
        let mut writer = LineReassembler::new("job1", Severity::Info, queue.clone());
        writer.write_all(input.as_bytes()).expect("write");
        assert_eq!(drain(&queue), expected);
    }

    #[rstest]
    fn messages_carry_configured_severity_and_job(queue: MessageQueue) {
        let mut writer = LineReassembler::new("nightly", Severity::Error, queue.clone());
        writer.write_all(b"boom\n").expect("write");
        let msg = queue.dequeue_blocking().expect("dequeue");
        assert_eq!(msg.severity(), Severity::Error);
        assert_eq!(msg.job_name(), "nightly");
    }

    #[rstest]
    fn invalid_utf8_is_replaced(queue: MessageQueue) {
        let mut writer = LineReassembler::new("job1", Severity::Info, queue.clone());
        writer.write_all(&[0x66, 0xff, 0x6f, b'\n']).expect("write");
        assert_eq!(drain(&queue), vec!["f\u{fffd}o"]);
    }

    #[rstest]
    fn finish_emits_residual_once(queue: MessageQueue) {
        let mut writer = LineReassembler::new("job1", Severity::Info, queue.clone());
        writer.write_all(b"done\ntail").expect("write");
        writer.finish().expect("finish");
        writer.finish().expect("second finish is a no-op");
        assert_eq!(drain(&queue), vec!["done", "tail"]);
    }

    #[rstest]
    fn independent_instances_do_not_share_buffers(queue: MessageQueue) {
        let mut out = LineReassembler::new("job1", Severity::Info, queue.clone());
        let mut err = LineReassembler::new("job1", Severity::Error, queue.clone());
        out.write_all(b"out-").expect("write");
        err.write_all(b"err\n").expect("write");
        out.write_all(b"line\n").expect("write");

        let first = queue.dequeue_blocking().expect("dequeue");
        let second = queue.dequeue_blocking().expect("dequeue");
        assert_eq!((first.text(), first.severity()), ("err", Severity::Error));
        assert_eq!((second.text(), second.severity()), ("out-line", Severity::Info));
    }
}

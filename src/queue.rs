//! Bounded queue shared by every job producer and the syslog forwarder.
//!
//! The queue wraps a `crossbeam_channel` bounded channel. Producers block in
//! [`MessageQueue::enqueue`] while the queue is full so a stalled collector
//! throttles noisy jobs instead of buffering without limit. The forwarder is
//! the single consumer and blocks in [`MessageQueue::dequeue_blocking`] while
//! the queue is empty.

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use thiserror::Error;

use crate::message::Message;

/// Default number of messages held before producers block.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;

/// Errors surfaced by queue operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    /// The queue is at capacity (only returned by [`MessageQueue::try_enqueue`]).
    #[error("message queue is full")]
    Full,
    /// The opposite side of the channel has gone away.
    #[error("message queue is closed")]
    Closed,
}

/// Process-wide FIFO of captured messages.
///
/// Cloning is cheap and yields another handle to the same channel. The queue
/// keeps both channel halves alive, so it never reports [`QueueError::Closed`]
/// while any handle exists.
#[derive(Clone, Debug)]
pub struct MessageQueue {
    tx: Sender<Message>,
    rx: Receiver<Message>,
    capacity: usize,
}

impl MessageQueue {
    /// Create a queue holding at most `capacity` messages.
    ///
    /// A zero capacity is bumped to one: crossbeam treats zero as a rendezvous
    /// channel which would turn every enqueue into a hand-off with the forwarder.
    pub fn bounded(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, rx) = bounded(capacity);
        Self { tx, rx, capacity }
    }

    /// Append a message, blocking while the queue is full.
    pub fn enqueue(&self, message: Message) -> Result<(), QueueError> {
        self.tx.send(message).map_err(|_| QueueError::Closed)
    }

    /// Append a message without blocking.
    pub fn try_enqueue(&self, message: Message) -> Result<(), QueueError> {
        self.tx.try_send(message).map_err(|err| match err {
            TrySendError::Full(_) => QueueError::Full,
            TrySendError::Disconnected(_) => QueueError::Closed,
        })
    }

    /// Remove the oldest message, blocking until one is available.
    pub fn dequeue_blocking(&self) -> Result<Message, QueueError> {
        self.rx.recv().map_err(|_| QueueError::Closed)
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for MessageQueue {
    fn default() -> Self {
        Self::bounded(DEFAULT_QUEUE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::mpsc,
        thread,
        time::Duration,
    };

    use rstest::rstest;

    use super::*;
    use crate::severity::Severity;

    fn msg(job: &str, text: &str) -> Message {
        Message::new(job, Severity::Info, text)
    }

    #[rstest]
    fn dequeues_in_enqueue_order() {
        let queue = MessageQueue::bounded(16);
        for i in 0..10 {
            queue.enqueue(msg("job", &i.to_string())).expect("enqueue");
        }
        let texts: Vec<String> = (0..10)
            .map(|_| queue.dequeue_blocking().expect("dequeue").text().to_owned())
            .collect();
        let expected: Vec<String> = (0..10).map(|i| i.to_string()).collect();
        assert_eq!(texts, expected);
        assert!(queue.is_empty());
    }

    #[rstest]
    fn preserves_per_producer_order_across_threads() {
        let queue = MessageQueue::bounded(4);
        let producers: Vec<_> = ["a", "b", "c"]
            .into_iter()
            .map(|job| {
                let queue = queue.clone();
                thread::spawn(move || {
                    for i in 0..50 {
                        queue.enqueue(msg(job, &i.to_string())).expect("enqueue");
                    }
                })
            })
            .collect();

        let mut seen: std::collections::HashMap<String, Vec<u32>> = Default::default();
        for _ in 0..150 {
            let m = queue.dequeue_blocking().expect("dequeue");
            seen.entry(m.job_name().to_owned())
                .or_default()
                .push(m.text().parse().expect("numeric text"));
        }
        for handle in producers {
            handle.join().expect("producer thread");
        }
        for job in ["a", "b", "c"] {
            assert_eq!(seen[job], (0..50).collect::<Vec<u32>>(), "order for {job}");
        }
    }

    #[rstest]
    fn try_enqueue_reports_full() {
        let queue = MessageQueue::bounded(1);
        queue.try_enqueue(msg("job", "first")).expect("room for one");
        assert_eq!(queue.try_enqueue(msg("job", "second")), Err(QueueError::Full));
        assert_eq!(queue.len(), 1);
    }

    #[rstest]
    fn enqueue_blocks_until_space_frees() {
        let queue = MessageQueue::bounded(1);
        queue.enqueue(msg("job", "first")).expect("enqueue");

        let (done_tx, done_rx) = mpsc::channel();
        let producer = {
            let queue = queue.clone();
            thread::spawn(move || {
                queue.enqueue(msg("job", "second")).expect("enqueue");
                done_tx.send(()).expect("signal");
            })
        };

        assert!(
            done_rx.recv_timeout(Duration::from_millis(100)).is_err(),
            "producer should block while the queue is full"
        );
        assert_eq!(queue.dequeue_blocking().expect("dequeue").text(), "first");
        done_rx
            .recv_timeout(Duration::from_secs(2))
            .expect("producer unblocks once space frees");
        producer.join().expect("producer thread");
        assert_eq!(queue.dequeue_blocking().expect("dequeue").text(), "second");
    }

    #[rstest]
    fn zero_capacity_is_clamped() {
        let queue = MessageQueue::bounded(0);
        assert_eq!(queue.capacity(), 1);
        queue.try_enqueue(msg("job", "only")).expect("one slot available");
    }
}

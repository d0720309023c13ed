// Rust guideline compliant 2026-10-19

//! Bounded multi-producer/single-consumer adapter for the `EventSink` and
//! `EventSource` ports, built on a tokio mpsc channel.
//!
//! [`bounded_queue`] returns a writer/reader pair. The writer is shared by all
//! producers and owns the one-shot `close()`; the reader is owned by the
//! recorder. Dropping the reader disconnects the queue, which releases any
//! producer blocked on a full buffer.

use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};

use domain::{EventSink, EventSource, QueueError, Transaction};
use tokio::sync::mpsc;

/// Create a queue holding at most `capacity` buffered transactions.
#[must_use]
pub fn bounded_queue(capacity: NonZeroUsize) -> (QueueWriter, QueueReader) {
    let (sender, receiver) = mpsc::channel(capacity.get());
    (
        QueueWriter { sender: Mutex::new(Some(sender)), capacity },
        QueueReader { receiver },
    )
}

// ---------------------------------------------------------------------------
// QueueWriter
// ---------------------------------------------------------------------------

/// Write side of the queue. Share it behind an `Arc`.
///
/// Holds the original sender until [`close`](Self::close) takes it. Producers
/// clone it for the duration of one `enqueue`, so once every producer has
/// returned and `close` has run, no sender is left and the reader sees the end
/// of input after draining the buffer.
#[derive(Debug)]
pub struct QueueWriter {
    sender: Mutex<Option<mpsc::Sender<Transaction>>>,
    capacity: NonZeroUsize,
}

impl QueueWriter {
    /// Buffer capacity this queue was created with.
    #[must_use]
    pub fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }

    /// Signal end of input. Idempotent: only the first call has an effect.
    ///
    /// Returns `true` when this call closed the queue.
    pub fn close(&self) -> bool {
        let closed_now = self.sender.lock().unwrap_or_else(PoisonError::into_inner).take().is_some();
        if closed_now {
            tracing::info!("queue.closed: capacity={}", self.capacity);
        }
        closed_now
    }

    /// `true` once [`close`](Self::close) has run.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.lock().unwrap_or_else(PoisonError::into_inner).is_none()
    }

    // Clone outside the async body so the guard never lives across an await.
    fn sender(&self) -> Option<mpsc::Sender<Transaction>> {
        self.sender.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl EventSink for QueueWriter {
    /// Push `tx`, suspending while the buffer is full.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Closed`] after `close()` -- a coordinator bug, logged
    /// as misuse -- or [`QueueError::Disconnected`] once the reader is gone.
    async fn enqueue(&self, tx: Transaction) -> Result<(), QueueError> {
        let Some(sender) = self.sender() else {
            tracing::error!(id = %tx.id(), "queue.misuse: enqueue after close");
            return Err(QueueError::Closed);
        };
        sender.send(tx).await.map_err(|mpsc::error::SendError(rejected)| {
            tracing::warn!(id = %rejected.id(), "queue.disconnected: reader dropped");
            QueueError::Disconnected
        })
    }
}

// ---------------------------------------------------------------------------
// QueueReader
// ---------------------------------------------------------------------------

/// Read side of the queue; exactly one exists per queue.
#[derive(Debug)]
pub struct QueueReader {
    receiver: mpsc::Receiver<Transaction>,
}

impl EventSource for QueueReader {
    /// Take the next transaction in arrival order.
    ///
    /// Buffered items are still delivered after `close()`.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Closed`] once closed and drained.
    async fn dequeue(&mut self) -> Result<Transaction, QueueError> {
        self.receiver.recv().await.ok_or(QueueError::Closed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::bounded_queue;
    use domain::{EventSink as _, EventSource as _, QueueError, Transaction};
    use std::num::NonZeroUsize;
    use std::sync::Arc;
    use std::time::Duration;

    fn cap(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn tx(id: &str) -> Transaction {
        Transaction::new(id.to_owned())
    }

    // BQ-T01: reads come back in arrival order.
    #[tokio::test]
    async fn fifo_order() {
        let (writer, mut reader) = bounded_queue(cap(4));
        for id in ["a", "b", "c"] {
            writer.enqueue(tx(id)).await.unwrap();
        }
        for id in ["a", "b", "c"] {
            assert_eq!(reader.dequeue().await.unwrap().id(), id);
        }
    }

    // BQ-T02: a full buffer suspends the producer.
    #[tokio::test(start_paused = true)]
    async fn full_buffer_blocks_enqueue() {
        let (writer, _reader) = bounded_queue(cap(1));
        writer.enqueue(tx("first")).await.unwrap();
        let second = tokio::time::timeout(Duration::from_millis(50), writer.enqueue(tx("second"))).await;
        assert!(second.is_err(), "enqueue into a full queue must wait");
    }

    // BQ-T03: buffered items survive close; then the reader sees Closed.
    #[tokio::test]
    async fn close_delivers_buffered_then_ends() {
        let (writer, mut reader) = bounded_queue(cap(2));
        writer.enqueue(tx("a")).await.unwrap();
        writer.enqueue(tx("b")).await.unwrap();
        writer.close();

        assert_eq!(reader.dequeue().await.unwrap().id(), "a");
        assert_eq!(reader.dequeue().await.unwrap().id(), "b");
        assert_eq!(reader.dequeue().await, Err(QueueError::Closed));
        assert_eq!(reader.dequeue().await, Err(QueueError::Closed));
    }

    // BQ-T04: close() is idempotent.
    #[tokio::test]
    async fn idempotent_close() {
        let (writer, mut reader) = bounded_queue(cap(1));
        assert!(!writer.is_closed());
        assert!(writer.close());
        assert!(!writer.close(), "second close must be a no-op");
        assert!(writer.is_closed());
        assert_eq!(reader.dequeue().await, Err(QueueError::Closed));
    }

    // BQ-T05: enqueue after close fails fast.
    #[tokio::test]
    async fn enqueue_after_close_is_closed() {
        let (writer, _reader) = bounded_queue(cap(1));
        writer.close();
        assert_eq!(writer.enqueue(tx("late")).await, Err(QueueError::Closed));
    }

    // BQ-T06: a dead reader releases a producer blocked on a full buffer.
    #[tokio::test]
    async fn dropped_reader_unblocks_writer() {
        let (writer, reader) = bounded_queue(cap(1));
        let writer = Arc::new(writer);
        writer.enqueue(tx("fill")).await.unwrap();

        let blocked = {
            let writer = Arc::clone(&writer);
            tokio::spawn(async move { writer.enqueue(tx("stuck")).await })
        };
        tokio::task::yield_now().await;
        drop(reader);

        assert_eq!(blocked.await.unwrap(), Err(QueueError::Disconnected));
        assert_eq!(writer.enqueue(tx("after")).await, Err(QueueError::Disconnected));
    }

    // BQ-T07: the reader waits for input while the queue is open.
    #[tokio::test]
    async fn dequeue_waits_for_concurrent_enqueue() {
        let (writer, mut reader) = bounded_queue(cap(1));
        let (read, ()) = tokio::join!(reader.dequeue(), async {
            tokio::task::yield_now().await;
            writer.enqueue(tx("late")).await.unwrap();
        });
        assert_eq!(read.unwrap().id(), "late");
        assert_eq!(writer.capacity().get(), 1);
    }
}

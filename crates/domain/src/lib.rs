// Rust guideline compliant 2026-10-19

//! Shared domain types for the transaction-ingestion pipeline.
//!
//! Defines `Transaction`, `CompletedTransaction`, the mutex-guarded
//! `SystemState`, the error types `QueueError` and `TaskFailure`, and the
//! hexagonal port traits: `EventSink`, `EventSource`, `IdGenerator`, `Reporter`.
//! All pipeline components depend on this crate.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// A single synthetic transaction, as created by a producer.
///
/// Owned by its producer until enqueued, then by the queue, then by the recorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    id: String,
    start_time: Instant,
}

impl Transaction {
    /// Create a transaction stamped with the current time.
    #[must_use]
    pub fn new(id: String) -> Self {
        Self::started_at(id, Instant::now())
    }

    /// Create a transaction that entered the system at `start_time`.
    #[must_use]
    pub fn started_at(id: String, start_time: Instant) -> Self {
        Self { id, start_time }
    }

    /// Opaque unique identifier, assigned at creation.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Point at which the transaction entered the system.
    #[must_use]
    pub fn start_time(&self) -> Instant {
        self.start_time
    }

    /// Stamp the commit time and derive the latency.
    ///
    /// An `end_time` earlier than `start_time` is clamped to `start_time`, so the
    /// resulting latency is never negative.
    #[must_use]
    pub fn complete(self, end_time: Instant) -> CompletedTransaction {
        let end_time = end_time.max(self.start_time);
        let latency = end_time.duration_since(self.start_time);
        CompletedTransaction { transaction: self, end_time, latency }
    }
}

/// A transaction stamped by the recorder. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedTransaction {
    transaction: Transaction,
    end_time: Instant,
    latency: Duration,
}

impl CompletedTransaction {
    /// Return the transaction ID, delegating to the wrapped transaction.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.transaction.id
    }

    /// The original, unstamped transaction.
    #[must_use]
    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    #[must_use]
    pub fn start_time(&self) -> Instant {
        self.transaction.start_time
    }

    #[must_use]
    pub fn end_time(&self) -> Instant {
        self.end_time
    }

    /// `end_time - start_time`, computed once in [`Transaction::complete`].
    #[must_use]
    pub fn latency(&self) -> Duration {
        self.latency
    }
}

// ---------------------------------------------------------------------------
// SystemState
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct StateInner {
    total_transactions: u64,
    /// Keyed by commit sequence number.
    store: BTreeMap<u64, CompletedTransaction>,
    throughput_samples: Vec<u64>,
}

/// Shared pipeline state: commit counter, transaction store and throughput samples.
///
/// Every read-modify-write happens under one private mutex, which is never held
/// across an `.await`. Written by the recorder (`commit`) and the sampler
/// (`record_throughput_sample`); read by the coordinator once both have joined.
#[derive(Debug, Default)]
pub struct SystemState {
    inner: Mutex<StateInner>,
}

/// Point-in-time copy of [`SystemState`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StateSnapshot {
    /// Number of committed transactions.
    pub total_transactions: u64,
    /// Committed transactions in commit order, paired with their sequence number.
    pub transactions: Vec<(u64, CompletedTransaction)>,
    /// Per-interval commit counts, in tick order.
    pub throughput_samples: Vec<u64>,
}

impl SystemState {
    /// Create empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // A panic elsewhere must not make committed data unreachable.
    fn lock(&self) -> MutexGuard<'_, StateInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publish a completed transaction and bump the commit counter as one step.
    ///
    /// Returns the commit sequence number (0-based), which is also the store key.
    pub fn commit(&self, completed: CompletedTransaction) -> u64 {
        let mut inner = self.lock();
        let sequence = inner.total_transactions;
        inner.store.insert(sequence, completed);
        inner.total_transactions += 1;
        sequence
    }

    /// Current number of committed transactions.
    #[must_use]
    pub fn total_transactions(&self) -> u64 {
        self.lock().total_transactions
    }

    /// Append the number of commits since `last_observed` to the sample list.
    ///
    /// Reads the counter, appends the delta and advances `last_observed`, all
    /// under the lock. Returns the delta.
    pub fn record_throughput_sample(&self, last_observed: &mut u64) -> u64 {
        let mut inner = self.lock();
        let current = inner.total_transactions;
        let delta = current.saturating_sub(*last_observed);
        *last_observed = current;
        inner.throughput_samples.push(delta);
        delta
    }

    /// Copy out everything committed and sampled so far.
    #[must_use]
    pub fn snapshot(&self) -> StateSnapshot {
        let inner = self.lock();
        StateSnapshot {
            total_transactions: inner.total_transactions,
            transactions: inner.store.iter().map(|(seq, tx)| (*seq, tx.clone())).collect(),
            throughput_samples: inner.throughput_samples.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned by event queue ports.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    /// The queue was closed for input. On the read side this means closed and drained.
    #[error("queue closed")]
    Closed,
    /// The reading side has gone away; nothing will ever drain the queue.
    #[error("queue disconnected: reader dropped")]
    Disconnected,
}

/// A background task that did not complete normally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskFailure {
    /// A producer failed to enqueue or panicked.
    #[error("producer failed: {reason}")]
    Producer {
        /// Human-readable description.
        reason: String,
    },
    /// The recorder panicked or was cancelled.
    #[error("recorder failed: {reason}")]
    Recorder {
        /// Human-readable description.
        reason: String,
    },
    /// The sampler panicked or was cancelled.
    #[error("sampler failed: {reason}")]
    Sampler {
        /// Human-readable description.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Hexagonal port: the write side of the event queue.
///
/// Shared by every producer. `enqueue` suspends while the queue is full.
pub trait EventSink: Send + Sync {
    /// Hand `tx` over to the queue.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::Closed` after the queue was closed for input, or
    /// `QueueError::Disconnected` when no reader remains.
    fn enqueue(&self, tx: Transaction) -> impl Future<Output = Result<(), QueueError>> + Send;
}

/// Hexagonal port: the read side of the event queue.
///
/// Owned by exactly one recorder, hence `&mut self`.
pub trait EventSource: Send {
    /// Take the next transaction, suspending while the queue is open but empty.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::Closed` once the queue is closed and fully drained.
    fn dequeue(&mut self) -> impl Future<Output = Result<Transaction, QueueError>> + Send;
}

/// Hexagonal port: source of unique opaque transaction identifiers.
pub trait IdGenerator: Send + Sync {
    /// Produce a fresh identifier, unique within a run.
    fn generate(&self) -> String;
}

/// Hexagonal port: fire-and-forget sink for report lines.
pub trait Reporter {
    /// Emit one line. Must not block the caller; failures are ignored.
    fn emit(&self, message: &str);
}

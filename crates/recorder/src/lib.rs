// Rust guideline compliant 2026-10-19

//! Recorder component -- the single consumer of the event queue.
//!
//! Drains transactions from an `EventSource` port, stamps their completion
//! time and commits them into the shared `SystemState`.
//!
//! Entry points: [`Recorder::record_once`], [`Recorder::run`].

use domain::{EventSource, QueueError, SystemState};
use std::time::Duration;
use tokio::time::Instant;

/// What a single commit produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitReceipt {
    /// Commit sequence number, also the store key.
    pub sequence: u64,
    /// Latency of the committed transaction.
    pub latency: Duration,
}

/// Drains the event queue into [`SystemState`].
///
/// Must run as exactly one task: commit sequence numbers are only meaningful
/// when stamping and committing happen in dequeue order. The source is taken
/// by `&mut`, so a second concurrent drain over the same source cannot compile.
#[derive(Debug, Default, Clone, Copy)]
pub struct Recorder;

impl Recorder {
    /// Create a recorder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Take one transaction from `source`, stamp it and commit it to `state`.
    ///
    /// Suspends while the source is open but empty. The transaction is stamped
    /// before the state lock is taken; insertion and the counter increment then
    /// happen as one locked step, so nothing half-stamped is ever visible.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Closed`] once the source is closed and drained.
    pub async fn record_once<S: EventSource>(
        &self,
        source: &mut S,
        state: &SystemState,
    ) -> Result<CommitReceipt, QueueError> {
        let tx = source.dequeue().await?;
        let completed = tx.complete(Instant::now());
        let latency = completed.latency();
        let id = completed.id().to_owned();
        let sequence = state.commit(completed);
        tracing::debug!(
            id = %id,
            sequence,
            latency_us = latency.as_micros(),
            "recorder.committed"
        );
        Ok(CommitReceipt { sequence, latency })
    }

    /// Drain `source` until it reports closed-and-drained.
    ///
    /// Returns the final `totalTransactions` from `state`.
    pub async fn run<S: EventSource>(&self, source: &mut S, state: &SystemState) -> u64 {
        let mut drained = 0u64;
        loop {
            match self.record_once(source, state).await {
                Ok(_) => drained += 1,
                Err(QueueError::Closed) => break,
                Err(e) => {
                    tracing::warn!("recorder.run.aborted: error={e}");
                    break;
                }
            }
        }
        let total = state.total_transactions();
        tracing::info!("recorder.run.stopped: drained={drained} total={total}");
        total
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

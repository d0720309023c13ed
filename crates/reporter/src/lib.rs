// Rust guideline compliant 2026-10-19

//! Reporter crate: turns the final `SystemState` snapshot into a
//! [`PipelineReport`] and writes it line by line to a `Reporter` port.
//!
//! Entry points: [`PipelineReport::new`], [`PipelineReport::emit`],
//! [`effective_throughput`]. [`TracingReporter`] is the default port adapter.

use domain::{CompletedTransaction, Reporter, StateSnapshot, TaskFailure};
use hdrhistogram::Histogram;
use std::time::Duration;
use tokio::time::Instant;

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// Committed transactions per second over the commit window.
///
/// `total / (max(end) - min(end))` in seconds. Returns `0.0` when there is no
/// window to divide by: no end times, or all of them identical.
#[must_use]
pub fn effective_throughput<I>(total: u64, end_times: I) -> f64
where
    I: IntoIterator<Item = Instant>,
{
    let mut window: Option<(Instant, Instant)> = None;
    for end in end_times {
        window = Some(match window {
            None => (end, end),
            Some((first, last)) => (first.min(end), last.max(end)),
        });
    }
    let Some((first, last)) = window else {
        return 0.0;
    };
    let span = last.duration_since(first);
    if span.is_zero() {
        return 0.0;
    }
    #[expect(clippy::cast_precision_loss, reason = "transaction counts stay far below 2^52")]
    let total = total as f64;
    total / span.as_secs_f64()
}

/// Significant decimal digits kept by the latency histogram.
const HISTOGRAM_SIGFIG: u8 = 3;

/// Latency distribution of the committed transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencySummary {
    /// Number of latencies summarised.
    pub count: u64,
    /// Smallest latency (exact).
    pub min: Duration,
    /// Arithmetic mean, to the microsecond.
    pub mean: Duration,
    /// Median, within histogram precision (3 significant digits).
    pub p50: Duration,
    /// 99th percentile, within histogram precision.
    pub p99: Duration,
    /// Largest latency (exact).
    pub max: Duration,
}

impl LatencySummary {
    /// Summarise `latencies`. Returns `None` for an empty input.
    ///
    /// Also returns `None`, after logging at `error`, if the histogram cannot be
    /// allocated; with fixed bounds this only happens on invalid bounds.
    #[must_use]
    pub fn from_latencies<I>(latencies: I) -> Option<Self>
    where
        I: IntoIterator<Item = Duration>,
    {
        // Fixed bounds cover every microsecond value a `u64` can hold.
        let mut histogram =
            match Histogram::<u64>::new_with_bounds(1, u64::MAX, HISTOGRAM_SIGFIG) {
                Ok(h) => h,
                Err(e) => {
                    tracing::error!("reporter.latency.histogram_failed: error={e}");
                    return None;
                }
            };
        let mut count = 0u64;
        let mut sum_us = 0u128;
        let mut min = Duration::MAX;
        let mut max = Duration::ZERO;
        for latency in latencies {
            let us = u64::try_from(latency.as_micros()).unwrap_or(u64::MAX);
            if histogram.record(us).is_err() {
                histogram.saturating_record(us);
            }
            count += 1;
            sum_us += latency.as_micros();
            min = min.min(latency);
            max = max.max(latency);
        }
        if count == 0 {
            return None;
        }
        let mean_us = u64::try_from(sum_us / u128::from(count)).unwrap_or(u64::MAX);
        Some(Self {
            count,
            min,
            mean: Duration::from_micros(mean_us),
            p50: Duration::from_micros(histogram.value_at_quantile(0.50)),
            p99: Duration::from_micros(histogram.value_at_quantile(0.99)),
            max,
        })
    }
}

// ---------------------------------------------------------------------------
// PipelineReport
// ---------------------------------------------------------------------------

/// Final result of one pipeline run.
///
/// Built from whatever was committed, so a run that ended in failures still
/// reports its partial data alongside the failures.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Final commit counter.
    pub total_transactions: u64,
    /// Committed transactions in commit order, with their sequence numbers.
    pub transactions: Vec<(u64, CompletedTransaction)>,
    /// Per-interval commit counts, in tick order.
    pub throughput_samples: Vec<u64>,
    /// See [`effective_throughput`].
    pub effective_tps: f64,
    /// `None` when nothing was committed.
    pub latency: Option<LatencySummary>,
    /// Tasks that did not complete normally.
    pub failures: Vec<TaskFailure>,
    /// The run was cut short by a shutdown request before every producer ran.
    pub interrupted: bool,
}

impl PipelineReport {
    /// Build a report from a final state snapshot and the collected failures.
    #[must_use]
    pub fn new(snapshot: StateSnapshot, failures: Vec<TaskFailure>) -> Self {
        let effective_tps = effective_throughput(
            snapshot.total_transactions,
            snapshot.transactions.iter().map(|(_, tx)| tx.end_time()),
        );
        let latency =
            LatencySummary::from_latencies(snapshot.transactions.iter().map(|(_, tx)| tx.latency()));
        Self {
            total_transactions: snapshot.total_transactions,
            transactions: snapshot.transactions,
            throughput_samples: snapshot.throughput_samples,
            effective_tps,
            latency,
            failures,
            interrupted: false,
        }
    }

    /// `true` when the run was not interrupted and every task completed normally.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        !self.interrupted && self.failures.is_empty()
    }

    /// Sum of all throughput samples.
    #[must_use]
    pub fn sampled_total(&self) -> u64 {
        self.throughput_samples.iter().sum()
    }

    /// Write the report to `reporter`, one line per call.
    pub fn emit<R: Reporter + ?Sized>(&self, reporter: &R) {
        reporter.emit("All latency values:");
        for (sequence, tx) in &self.transactions {
            reporter.emit(&format!(
                "transaction #{sequence} id={} latency={:?}",
                tx.id(),
                tx.latency()
            ));
        }

        reporter.emit("All TPS values:");
        for (i, tps) in self.throughput_samples.iter().enumerate() {
            reporter.emit(&format!("interval {}: TPS = {tps}", i + 1));
        }

        reporter.emit(&format!("total transactions: {}", self.total_transactions));
        reporter.emit(&format!("effective throughput: {:.2} tx/s", self.effective_tps));
        if let Some(l) = &self.latency {
            reporter.emit(&format!(
                "latency: count={} min={:?} mean={:?} p50={:?} p99={:?} max={:?}",
                l.count, l.min, l.mean, l.p50, l.p99, l.max
            ));
        }
        if self.interrupted {
            reporter.emit("run interrupted: report covers committed transactions only");
        }
        for failure in &self.failures {
            reporter.emit(&format!("failure: {failure}"));
        }
    }
}

// ---------------------------------------------------------------------------
// TracingReporter
// ---------------------------------------------------------------------------

/// `Reporter` adapter that logs each line as an `info` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl TracingReporter {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reporter for TracingReporter {
    fn emit(&self, message: &str) {
        tracing::info!(target: "report", "{message}");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

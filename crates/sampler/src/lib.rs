// Rust guideline compliant 2026-10-19

//! Throughput sampler -- wakes on a periodic timer, reads the commit counter
//! in `SystemState` and appends the per-interval delta (transactions per tick).
//!
//! Entry point: [`ThroughputSampler::run`]. Configuration via
//! [`SamplerConfig::builder`].
//!
//! # Termination
//!
//! [`StopPolicy::OnIdle`] stops at the first zero delta. This treats "idle for
//! one interval" as "drained", so a lull in producer arrivals longer than the
//! interval ends sampling early and the remaining commits are never sampled.
//! [`StopPolicy::OnSignal`] ignores zero deltas and stops only when the
//! coordinator flips the stop signal; it then samples one last tick so the
//! deltas add up to the final commit count.

use domain::SystemState;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};

// ---------------------------------------------------------------------------
// SamplerError
// ---------------------------------------------------------------------------

/// Errors that can occur while configuring the sampler.
#[derive(Debug, thiserror::Error)]
pub enum SamplerError {
    /// The supplied configuration is invalid.
    #[error("invalid sampler configuration: {reason}")]
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// SamplerConfig + builder
// ---------------------------------------------------------------------------

/// When the sampler decides to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopPolicy {
    /// Stop at the first tick that observes no new commits (or on the stop signal).
    OnIdle,
    /// Stop only on the coordinator's stop signal, after one final tick.
    #[default]
    OnSignal,
}

/// Runtime configuration for a [`ThroughputSampler`].
///
/// Construct via [`SamplerConfig::builder`].
#[derive(Debug, Clone)]
pub struct SamplerConfig {
    /// Period between two samples.
    pub interval: Duration,
    /// Termination policy.
    pub stop_policy: StopPolicy,
}

/// Builder for [`SamplerConfig`].
#[derive(Debug)]
pub struct SamplerConfigBuilder {
    interval: Duration,
    stop_policy: StopPolicy,
}

impl SamplerConfig {
    /// Create a builder. `interval` is the only required parameter.
    ///
    /// Default values: `stop_policy = OnSignal`.
    #[must_use]
    pub fn builder(interval: Duration) -> SamplerConfigBuilder {
        SamplerConfigBuilder { interval, stop_policy: StopPolicy::default() }
    }
}

impl SamplerConfigBuilder {
    /// Override the termination policy.
    #[must_use]
    pub fn stop_policy(mut self, stop_policy: StopPolicy) -> Self {
        self.stop_policy = stop_policy;
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SamplerError::InvalidConfig`] when `interval` is zero.
    #[must_use = "the Result must be checked; use ? or unwrap"]
    pub fn build(self) -> Result<SamplerConfig, SamplerError> {
        if self.interval.is_zero() {
            return Err(SamplerError::InvalidConfig {
                reason: "sampling interval must be non-zero".to_owned(),
            });
        }
        Ok(SamplerConfig { interval: self.interval, stop_policy: self.stop_policy })
    }
}

// ---------------------------------------------------------------------------
// ThroughputSampler
// ---------------------------------------------------------------------------

/// Why the sampler stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A tick observed zero new commits under [`StopPolicy::OnIdle`].
    Idle,
    /// The stop signal fired, or its sender went away.
    Signaled,
}

/// Summary returned by [`ThroughputSampler::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerOutcome {
    /// Number of samples appended to the state.
    pub samples: usize,
    /// Why sampling ended.
    pub reason: StopReason,
}

/// Periodically snapshots the commit counter to derive throughput.
///
/// Only reads the counter and appends to the sample list; never touches
/// transaction data.
#[derive(Debug)]
pub struct ThroughputSampler {
    config: SamplerConfig,
}

impl ThroughputSampler {
    /// Create a new sampler from `config`.
    #[must_use]
    pub fn new(config: SamplerConfig) -> Self {
        Self { config }
    }

    /// Sample `state` every `config.interval` until the stop policy fires.
    ///
    /// The first sample is taken one full interval after the call. Deltas are
    /// measured from zero, so the sampler should start before anything commits.
    /// The timer lives inside this future and is released on every exit path,
    /// including cancellation of the future itself.
    pub async fn run(&self, state: &SystemState, mut stop: watch::Receiver<bool>) -> SamplerOutcome {
        let period = self.config.interval;
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut last_observed = 0u64;
        let mut samples = 0usize;
        loop {
            tokio::select! {
                biased;
                _ = ticker.tick() => {
                    let delta = state.record_throughput_sample(&mut last_observed);
                    samples += 1;
                    tracing::debug!("sampler.tick: interval={samples} tps={delta}");
                    if self.config.stop_policy == StopPolicy::OnIdle && delta == 0 {
                        tracing::info!("sampler.run.stopped: reason=idle samples={samples}");
                        return SamplerOutcome { samples, reason: StopReason::Idle };
                    }
                }
                // Err means the sender is gone, which is as final as a stop.
                _ = stop.changed() => {
                    ticker.tick().await;
                    let delta = state.record_throughput_sample(&mut last_observed);
                    samples += 1;
                    tracing::debug!("sampler.tick: interval={samples} tps={delta} final=true");
                    tracing::info!("sampler.run.stopped: reason=signal samples={samples}");
                    return SamplerOutcome { samples, reason: StopReason::Signaled };
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

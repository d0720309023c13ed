// Rust guideline compliant 2026-10-19

//! Pipeline-wide configuration, composed from the per-component configs.

use std::num::NonZeroUsize;
use std::time::Duration;

use producer::{ProducerConfig, ProducerError, SpawnDelay};
use sampler::{SamplerConfig, SamplerError, StopPolicy};

/// Default event queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;
/// Default number of producers.
pub const DEFAULT_PRODUCERS: usize = 50;
/// Default throughput sampling period.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_secs(1);
/// Default upper bound of the random pause between producer spawns.
pub const DEFAULT_SPAWN_JITTER: Duration = Duration::from_millis(100);

/// Errors raised while building a [`PipelineConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A pipeline-level parameter is invalid.
    #[error("invalid pipeline configuration: {reason}")]
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
    /// The producer configuration was rejected.
    #[error(transparent)]
    Producer(#[from] ProducerError),
    /// The sampler configuration was rejected.
    #[error(transparent)]
    Sampler(#[from] SamplerError),
}

/// Runtime configuration for a [`Coordinator`](crate::Coordinator) run.
///
/// Construct via [`PipelineConfig::builder`].
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Event queue capacity.
    pub queue_capacity: NonZeroUsize,
    /// Producer pool settings.
    pub producer: ProducerConfig,
    /// Throughput sampler settings.
    pub sampler: SamplerConfig,
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    queue_capacity: usize,
    producers: usize,
    spawn_delay: SpawnDelay,
    sample_interval: Duration,
    stop_policy: StopPolicy,
    seed: Option<u64>,
}

impl PipelineConfig {
    /// Create a builder with every parameter at its default.
    ///
    /// Defaults: capacity 10, 50 producers, 1 s sampling, uniform 0-100 ms spawn
    /// jitter, [`StopPolicy::OnSignal`], OS-seeded jitter.
    #[must_use]
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            producers: DEFAULT_PRODUCERS,
            spawn_delay: SpawnDelay::Uniform { max: DEFAULT_SPAWN_JITTER },
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            stop_policy: StopPolicy::default(),
            seed: None,
        }
    }
}

impl PipelineConfigBuilder {
    /// Override the event queue capacity (must be at least 1).
    #[must_use]
    pub fn queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    /// Override the number of producers (0 is allowed).
    #[must_use]
    pub fn producers(mut self, producers: usize) -> Self {
        self.producers = producers;
        self
    }

    /// Override the pause between producer spawns.
    #[must_use]
    pub fn spawn_delay(mut self, spawn_delay: SpawnDelay) -> Self {
        self.spawn_delay = spawn_delay;
        self
    }

    /// Override the sampling period.
    #[must_use]
    pub fn sample_interval(mut self, sample_interval: Duration) -> Self {
        self.sample_interval = sample_interval;
        self
    }

    /// Override the sampler termination policy.
    #[must_use]
    pub fn stop_policy(mut self, stop_policy: StopPolicy) -> Self {
        self.stop_policy = stop_policy;
        self
    }

    /// Fix the spawn-jitter seed.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfig`] for a zero queue capacity, and
    /// forwards producer and sampler validation errors.
    #[must_use = "the Result must be checked; use ? or unwrap"]
    pub fn build(self) -> Result<PipelineConfig, ConfigError> {
        let queue_capacity =
            NonZeroUsize::new(self.queue_capacity).ok_or_else(|| ConfigError::InvalidConfig {
                reason: "queue_capacity must be >= 1".to_owned(),
            })?;

        let mut producer = ProducerConfig::builder(self.producers).spawn_delay(self.spawn_delay);
        if let Some(seed) = self.seed {
            producer = producer.seed(seed);
        }
        let sampler = SamplerConfig::builder(self.sample_interval).stop_policy(self.stop_policy);

        Ok(PipelineConfig {
            queue_capacity,
            producer: producer.build()?,
            sampler: sampler.build()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = PipelineConfig::builder().build().unwrap();
        assert_eq!(cfg.queue_capacity.get(), 10);
        assert_eq!(cfg.producer.producers, 50);
        assert_eq!(cfg.producer.spawn_delay, SpawnDelay::Uniform { max: Duration::from_millis(100) });
        assert_eq!(cfg.sampler.interval, Duration::from_secs(1));
        assert_eq!(cfg.sampler.stop_policy, StopPolicy::OnSignal);
    }

    #[test]
    fn overrides_reach_component_configs() {
        let cfg = PipelineConfig::builder()
            .queue_capacity(1)
            .producers(3)
            .spawn_delay(SpawnDelay::None)
            .sample_interval(Duration::from_millis(10))
            .stop_policy(StopPolicy::OnIdle)
            .seed(9)
            .build()
            .unwrap();
        assert_eq!(cfg.queue_capacity.get(), 1);
        assert_eq!(cfg.producer.producers, 3);
        assert_eq!(cfg.producer.seed, Some(9));
        assert_eq!(cfg.sampler.stop_policy, StopPolicy::OnIdle);
    }

    #[test]
    fn rejects_zero_capacity() {
        let result = PipelineConfig::builder().queue_capacity(0).build();
        assert!(matches!(result, Err(ConfigError::InvalidConfig { .. })));
    }

    #[test]
    fn forwards_sampler_errors() {
        let result = PipelineConfig::builder().sample_interval(Duration::ZERO).build();
        assert!(matches!(result, Err(ConfigError::Sampler(_))));
    }

    #[test]
    fn forwards_producer_errors() {
        let result = PipelineConfig::builder()
            .spawn_delay(SpawnDelay::Uniform { max: Duration::ZERO })
            .build();
        assert!(matches!(result, Err(ConfigError::Producer(_))));
    }
}

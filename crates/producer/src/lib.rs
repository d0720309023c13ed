// Rust guideline compliant 2026-10-19

//! Producer pool -- spawns N independent producer tasks, each creating one
//! transaction and handing it to an `EventSink` hexagonal port.
//!
//! Entry points: [`produce_one`], [`ProducerPool::run`].
//! Configuration via [`ProducerConfig::builder`].

use domain::{EventSink, IdGenerator, QueueError, Transaction};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinSet;

// ---------------------------------------------------------------------------
// ProducerError
// ---------------------------------------------------------------------------

/// Errors that can occur during transaction production.
#[derive(Debug, thiserror::Error)]
pub enum ProducerError {
    /// The supplied configuration is invalid.
    #[error("invalid producer configuration: {reason}")]
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
    /// The queue refused the transaction.
    #[error("queue error: {source}")]
    Queue {
        /// The underlying queue error.
        #[from]
        source: QueueError,
    },
    /// The producer task panicked before it could report back.
    #[error("producer task panicked: {reason}")]
    Panicked {
        /// Join error description, including the panic payload when available.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// ProducerConfig + builder
// ---------------------------------------------------------------------------

/// Pause inserted between two consecutive producer spawns.
///
/// Shapes the arrival curve seen by the throughput sampler; has no effect on
/// correctness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnDelay {
    /// Spawn every producer back to back.
    None,
    /// Same pause between every pair of spawns.
    Fixed(Duration),
    /// Pause drawn uniformly from `[0, max)` for every gap.
    Uniform {
        /// Exclusive upper bound, must be non-zero.
        max: Duration,
    },
}

/// Runtime configuration for a [`ProducerPool`].
///
/// Construct via [`ProducerConfig::builder`].
#[derive(Debug, Clone)]
pub struct ProducerConfig {
    /// Number of producer tasks to spawn. Zero is allowed.
    pub producers: usize,
    /// Pause between spawns.
    pub spawn_delay: SpawnDelay,
    /// Optional RNG seed for reproducible jitter. `None` seeds from the OS.
    pub seed: Option<u64>,
}

/// Builder for [`ProducerConfig`].
///
/// Obtain via [`ProducerConfig::builder`]; finalize with [`build`](Self::build).
#[derive(Debug)]
pub struct ProducerConfigBuilder {
    producers: usize,
    spawn_delay: SpawnDelay,
    seed: Option<u64>,
}

impl ProducerConfig {
    /// Create a builder. `producers` is the only required parameter.
    ///
    /// Default values: `spawn_delay = Uniform { max: 100 ms }`, `seed = None`.
    #[must_use]
    pub fn builder(producers: usize) -> ProducerConfigBuilder {
        ProducerConfigBuilder {
            producers,
            // Up to 100 ms between spawns keeps per-second samples well below the burst rate.
            spawn_delay: SpawnDelay::Uniform { max: Duration::from_millis(100) },
            seed: None,
        }
    }
}

impl ProducerConfigBuilder {
    /// Override the pause between spawns.
    #[must_use]
    pub fn spawn_delay(mut self, spawn_delay: SpawnDelay) -> Self {
        self.spawn_delay = spawn_delay;
        self
    }

    /// Fix the RNG seed for deterministic jitter (useful in tests).
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ProducerError::InvalidConfig`] when a uniform spawn delay has a
    /// zero upper bound.
    #[must_use = "the Result must be checked; use ? or unwrap"]
    pub fn build(self) -> Result<ProducerConfig, ProducerError> {
        if let SpawnDelay::Uniform { max } = self.spawn_delay
            && max.is_zero()
        {
            return Err(ProducerError::InvalidConfig {
                reason: "uniform spawn delay needs a non-zero upper bound".to_owned(),
            });
        }
        Ok(ProducerConfig {
            producers: self.producers,
            spawn_delay: self.spawn_delay,
            seed: self.seed,
        })
    }
}

// ---------------------------------------------------------------------------
// Single producer
// ---------------------------------------------------------------------------

/// Create one transaction with a fresh id and hand it to `sink`.
///
/// Suspends while the sink is full. Returns the id of the enqueued transaction.
///
/// # Errors
///
/// Propagates any [`QueueError`] wrapped in [`ProducerError::Queue`].
pub async fn produce_one<Q, G>(sink: &Q, ids: &G) -> Result<String, ProducerError>
where
    Q: EventSink,
    G: IdGenerator,
{
    let tx = Transaction::new(ids.generate());
    let id = tx.id().to_owned();
    sink.enqueue(tx).await?;
    tracing::debug!(id = %id, "producer.enqueued");
    Ok(id)
}

// ---------------------------------------------------------------------------
// ProducerPool
// ---------------------------------------------------------------------------

/// Result of a full pool run, once every producer task has been joined.
#[derive(Debug, Default)]
pub struct PoolOutcome {
    /// Ids of successfully enqueued transactions, in completion order.
    pub enqueued: Vec<String>,
    /// One entry per producer that failed or panicked.
    pub failures: Vec<ProducerError>,
}

impl PoolOutcome {
    /// `true` when every producer enqueued its transaction.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Spawns the configured number of producers and joins them all.
///
/// Producers never talk to each other; completion order is unspecified.
#[derive(Debug)]
pub struct ProducerPool {
    config: ProducerConfig,
    rng: Mutex<StdRng>,
}

impl ProducerPool {
    /// Create a new pool from `config`.
    ///
    /// Seeds the jitter RNG from `config.seed` if set, otherwise from the OS.
    #[must_use]
    pub fn new(config: ProducerConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { config, rng: Mutex::new(rng) }
    }

    fn next_delay(&self) -> Duration {
        match self.config.spawn_delay {
            SpawnDelay::None => Duration::ZERO,
            SpawnDelay::Fixed(delay) => delay,
            SpawnDelay::Uniform { max } => self
                .rng
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .random_range(Duration::ZERO..max),
        }
    }

    /// Spawn every producer, then wait for all of them.
    ///
    /// Each producer runs [`produce_one`] on its own task. The configured
    /// [`SpawnDelay`] is applied between spawns. All handles are tracked in a
    /// single `JoinSet`, so a panicking producer shows up in
    /// [`PoolOutcome::failures`] instead of being lost.
    pub async fn run<Q, G>(&self, sink: Arc<Q>, ids: Arc<G>) -> PoolOutcome
    where
        Q: EventSink + 'static,
        G: IdGenerator + 'static,
    {
        let mut tasks = JoinSet::new();
        for index in 0..self.config.producers {
            if index > 0 {
                let delay = self.next_delay();
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
            let sink = Arc::clone(&sink);
            let ids = Arc::clone(&ids);
            tasks.spawn(async move { produce_one(&*sink, &*ids).await });
        }
        tracing::info!("producer.pool.spawned: producers={}", self.config.producers);

        let mut outcome = PoolOutcome::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(id)) => outcome.enqueued.push(id),
                Ok(Err(e)) => {
                    tracing::error!("producer.failed: error={e}");
                    outcome.failures.push(e);
                }
                Err(join_err) => {
                    tracing::error!("producer.panicked: error={join_err}");
                    outcome.failures.push(ProducerError::Panicked { reason: join_err.to_string() });
                }
            }
        }
        tracing::info!(
            "producer.pool.joined: enqueued={} failed={}",
            outcome.enqueued.len(),
            outcome.failures.len()
        );
        outcome
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::{ProducerConfig, ProducerError, ProducerPool, SpawnDelay, produce_one};
    use domain::{EventSink, IdGenerator, QueueError, Transaction};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::time::Instant;

    // ------------------------------------------------------------------
    // Test helpers
    // ------------------------------------------------------------------

    /// Sink that keeps every transaction in arrival order.
    struct RecordingSink {
        received: Mutex<Vec<Transaction>>,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self { received: Mutex::new(vec![]) }
        }

        fn ids(&self) -> Vec<String> {
            self.received.lock().unwrap().iter().map(|tx| tx.id().to_owned()).collect()
        }
    }

    impl EventSink for RecordingSink {
        async fn enqueue(&self, tx: Transaction) -> Result<(), QueueError> {
            self.received.lock().unwrap().push(tx);
            Ok(())
        }
    }

    /// Sink that was already closed.
    struct ClosedSink;

    impl EventSink for ClosedSink {
        async fn enqueue(&self, _tx: Transaction) -> Result<(), QueueError> {
            Err(QueueError::Closed)
        }
    }

    struct CountingIds(AtomicU64);

    impl CountingIds {
        fn new() -> Self {
            Self(AtomicU64::new(0))
        }
    }

    impl IdGenerator for CountingIds {
        fn generate(&self) -> String {
            format!("id-{}", self.0.fetch_add(1, Ordering::SeqCst))
        }
    }

    /// Panics on its third call.
    struct FlakyIds(AtomicU64);

    impl IdGenerator for FlakyIds {
        fn generate(&self) -> String {
            let n = self.0.fetch_add(1, Ordering::SeqCst);
            assert!(n != 2, "id source exhausted");
            format!("id-{n}")
        }
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    #[test]
    fn config_defaults() {
        let cfg = ProducerConfig::builder(50).build().unwrap();
        assert_eq!(cfg.producers, 50);
        assert_eq!(cfg.spawn_delay, SpawnDelay::Uniform { max: Duration::from_millis(100) });
        assert!(cfg.seed.is_none());
    }

    #[test]
    fn config_accepts_zero_producers() {
        let cfg = ProducerConfig::builder(0).build().unwrap();
        assert_eq!(cfg.producers, 0);
    }

    #[test]
    fn config_rejects_zero_uniform_bound() {
        let result = ProducerConfig::builder(3)
            .spawn_delay(SpawnDelay::Uniform { max: Duration::ZERO })
            .build();
        assert!(matches!(result, Err(ProducerError::InvalidConfig { .. })));
    }

    #[test]
    fn uniform_delays_bounded_and_seeded() {
        let max = Duration::from_millis(100);
        let make = || {
            ProducerPool::new(
                ProducerConfig::builder(1)
                    .spawn_delay(SpawnDelay::Uniform { max })
                    .seed(7)
                    .build()
                    .unwrap(),
            )
        };
        let (a, b) = (make(), make());
        for _ in 0..50 {
            let d = a.next_delay();
            assert!(d < max, "delay {d:?} not below {max:?}");
            assert_eq!(d, b.next_delay(), "identical seeds must give identical delays");
        }
    }

    // ------------------------------------------------------------------
    // produce_one
    // ------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn produce_one_stamps_and_enqueues() {
        let sink = RecordingSink::new();
        let before = Instant::now();
        let id = produce_one(&sink, &CountingIds::new()).await.unwrap();
        assert_eq!(id, "id-0");
        let received = sink.received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].id(), "id-0");
        assert!(received[0].start_time() >= before);
    }

    #[tokio::test]
    async fn produce_one_propagates_closed() {
        let result = produce_one(&ClosedSink, &CountingIds::new()).await;
        assert!(
            matches!(result, Err(ProducerError::Queue { source: QueueError::Closed })),
            "Closed must be propagated: {result:?}"
        );
    }

    // ------------------------------------------------------------------
    // Pool run
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn run_spawns_exactly_n() {
        let cfg = ProducerConfig::builder(25).spawn_delay(SpawnDelay::None).build().unwrap();
        let sink = Arc::new(RecordingSink::new());
        let outcome = ProducerPool::new(cfg).run(Arc::clone(&sink), Arc::new(CountingIds::new())).await;

        assert!(outcome.is_clean());
        assert_eq!(outcome.enqueued.len(), 25);
        let unique: HashSet<String> = sink.ids().into_iter().collect();
        assert_eq!(unique.len(), 25, "every producer must enqueue a distinct transaction");
    }

    #[tokio::test]
    async fn run_with_zero_producers() {
        let cfg = ProducerConfig::builder(0).build().unwrap();
        let sink = Arc::new(RecordingSink::new());
        let outcome = ProducerPool::new(cfg).run(Arc::clone(&sink), Arc::new(CountingIds::new())).await;
        assert!(outcome.is_clean());
        assert!(outcome.enqueued.is_empty());
        assert!(sink.ids().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn run_applies_fixed_delay_between_spawns() {
        let cfg = ProducerConfig::builder(5)
            .spawn_delay(SpawnDelay::Fixed(Duration::from_millis(10)))
            .build()
            .unwrap();
        let sink = Arc::new(RecordingSink::new());
        let started = Instant::now();
        ProducerPool::new(cfg).run(Arc::clone(&sink), Arc::new(CountingIds::new())).await;

        // Four gaps between five spawns.
        assert_eq!(started.elapsed(), Duration::from_millis(40));
        // Each producer ran before the next one was spawned.
        assert_eq!(sink.ids(), vec!["id-0", "id-1", "id-2", "id-3", "id-4"]);
    }

    #[tokio::test]
    async fn run_reports_queue_failures() {
        let cfg = ProducerConfig::builder(3).spawn_delay(SpawnDelay::None).build().unwrap();
        let outcome = ProducerPool::new(cfg).run(Arc::new(ClosedSink), Arc::new(CountingIds::new())).await;
        assert!(outcome.enqueued.is_empty());
        assert_eq!(outcome.failures.len(), 3);
        assert!(
            outcome
                .failures
                .iter()
                .all(|e| matches!(e, ProducerError::Queue { source: QueueError::Closed }))
        );
    }

    #[tokio::test]
    async fn run_surfaces_panicking_producer() {
        let cfg = ProducerConfig::builder(5).spawn_delay(SpawnDelay::None).build().unwrap();
        let sink = Arc::new(RecordingSink::new());
        let outcome = ProducerPool::new(cfg)
            .run(Arc::clone(&sink), Arc::new(FlakyIds(AtomicU64::new(0))))
            .await;

        assert_eq!(outcome.enqueued.len(), 4);
        assert_eq!(outcome.failures.len(), 1);
        assert!(matches!(outcome.failures[0], ProducerError::Panicked { .. }));
        assert_eq!(sink.ids().len(), 4);
    }
}

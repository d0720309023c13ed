// Rust guideline compliant 2026-10-19

//! Coordinator -- owns one pipeline run from startup to the final report.
//!
//! Order of a run:
//! 1. create the shared state, the queue and the sampler stop signal;
//! 2. spawn the recorder and the sampler, so a consumer exists before any input;
//! 3. run the producer pool and join every producer, or abandon the pool when
//!    a shutdown is requested;
//! 4. close the queue and join the recorder once it has drained;
//! 5. signal the sampler to stop and join it;
//! 6. build the report from whatever was committed.

use std::future::pending;
use std::sync::Arc;

use domain::{IdGenerator, SystemState, TaskFailure};
use producer::ProducerPool;
use recorder::Recorder;
use reporter::PipelineReport;
use sampler::{SamplerOutcome, ThroughputSampler};
use tokio::sync::watch;

use crate::adapters::{QueueReader, bounded_queue};
use crate::config::PipelineConfig;

/// Orchestrates producers, recorder and sampler for one run.
#[derive(Debug)]
pub struct Coordinator {
    config: PipelineConfig,
}

impl Coordinator {
    /// Create a coordinator for `config`.
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline to completion and report the result.
    ///
    /// Never returns early: a failing or panicking task is recorded in
    /// [`PipelineReport::failures`] and the remaining tasks are still joined.
    /// If the recorder dies, its queue reader is dropped with it, so blocked
    /// producers fail with `Disconnected` instead of hanging.
    pub async fn run<G>(&self, ids: Arc<G>) -> PipelineReport
    where
        G: IdGenerator + 'static,
    {
        self.run_until(ids, pending()).await
    }

    /// Like [`run`](Self::run), but stops early once `shutdown` resolves.
    ///
    /// On shutdown no further producers are spawned and the ones still running
    /// are aborted. The queue is then closed and drained as usual, so the report
    /// holds every transaction that reached the queue, with
    /// [`PipelineReport::interrupted`] set.
    pub async fn run_until<G, F>(&self, ids: Arc<G>, shutdown: F) -> PipelineReport
    where
        G: IdGenerator + 'static,
        F: Future<Output = ()>,
    {
        let sampler = ThroughputSampler::new(self.config.sampler.clone());
        self.run_stages(
            ids,
            shutdown,
            |mut reader, state| async move { Recorder::new().run(&mut reader, &state).await },
            move |state, stop| async move { sampler.run(&state, stop).await },
        )
        .await
    }

    /// Run body with the recorder and sampler tasks supplied by the caller.
    async fn run_stages<G, F, R, RFut, S, SFut>(
        &self,
        ids: Arc<G>,
        shutdown: F,
        recorder: R,
        sampler: S,
    ) -> PipelineReport
    where
        G: IdGenerator + 'static,
        F: Future<Output = ()>,
        R: FnOnce(QueueReader, Arc<SystemState>) -> RFut,
        RFut: Future<Output = u64> + Send + 'static,
        S: FnOnce(Arc<SystemState>, watch::Receiver<bool>) -> SFut,
        SFut: Future<Output = SamplerOutcome> + Send + 'static,
    {
        let state = Arc::new(SystemState::new());
        let (writer, reader) = bounded_queue(self.config.queue_capacity);
        let writer = Arc::new(writer);
        let (stop_tx, stop_rx) = watch::channel(false);
        let mut failures = Vec::new();

        tracing::info!(
            "coordinator.run.started: producers={} capacity={} interval={:?}",
            self.config.producer.producers,
            self.config.queue_capacity,
            self.config.sampler.interval
        );

        let recorder = tokio::spawn(recorder(reader, Arc::clone(&state)));
        let sampler = tokio::spawn(sampler(Arc::clone(&state), stop_rx));

        // Dropping the pool future drops its JoinSet, which aborts every producer.
        let pool = ProducerPool::new(self.config.producer.clone());
        let interrupted = tokio::select! {
            outcome = pool.run(Arc::clone(&writer), ids) => {
                failures.extend(
                    outcome.failures.iter().map(|e| TaskFailure::Producer { reason: e.to_string() }),
                );
                false
            }
            () = shutdown => {
                tracing::warn!("coordinator.run.interrupted: abandoning unfinished producers");
                true
            }
        };

        writer.close();

        match recorder.await {
            Ok(total) => tracing::info!("coordinator.recorder.joined: total={total}"),
            Err(e) => {
                tracing::error!("coordinator.recorder.failed: error={e}");
                failures.push(TaskFailure::Recorder { reason: e.to_string() });
            }
        }

        // Nothing can commit any more; let the sampler take its last tick.
        stop_tx.send_replace(true);

        match sampler.await {
            Ok(done) => tracing::info!(
                "coordinator.sampler.joined: samples={} reason={:?}",
                done.samples,
                done.reason
            ),
            Err(e) => {
                tracing::error!("coordinator.sampler.failed: error={e}");
                failures.push(TaskFailure::Sampler { reason: e.to_string() });
            }
        }

        let mut report = PipelineReport::new(state.snapshot(), failures);
        report.interrupted = interrupted;
        tracing::info!(
            "coordinator.run.finished: total={} samples={} failures={} interrupted={}",
            report.total_transactions,
            report.throughput_samples.len(),
            report.failures.len(),
            report.interrupted
        );
        report
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

// Rust guideline compliant 2026-10-19

//! Ingestion pipeline entry point.
//!
//! Runs one pipeline with the default configuration (50 producers, queue
//! capacity 10, 1 s throughput sampling, 0-100 ms spawn jitter) and logs the
//! final report.
//!
//! # Usage
//!
//! ```text
//! RUST_LOG=info cargo run --bin ingestion
//!
//! # Also show per-transaction enqueue/commit events
//! RUST_LOG=debug cargo run --bin ingestion
//! ```

use std::sync::Arc;

use anyhow::Context as _;
use ingestion::adapters::UuidIds;
use ingestion::{Coordinator, PipelineConfig};
use reporter::TracingReporter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = PipelineConfig::builder()
        .build()
        .context("failed to build pipeline config")?;
    let coordinator = Coordinator::new(config);

    // CTRL+C stops spawning producers; whatever reached the queue is still
    // committed and reported.
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("main.signal.unavailable: error={e}");
            std::future::pending::<()>().await;
        }
        tracing::info!("main.shutdown: ctrl_c received, draining committed work");
    };
    let report = coordinator.run_until(Arc::new(UuidIds::new()), shutdown).await;

    report.emit(&TracingReporter::new());

    if report.interrupted {
        anyhow::bail!("pipeline interrupted after {} transaction(s)", report.total_transactions);
    }
    if !report.is_clean() {
        anyhow::bail!("pipeline finished with {} failed task(s)", report.failures.len());
    }
    Ok(())
}

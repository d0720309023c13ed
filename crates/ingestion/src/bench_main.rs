// Rust guideline compliant 2026-10-19

//! Pipeline throughput benchmark entry point.
//!
//! Measures effective throughput (committed transactions per second over the
//! commit window) across queue capacities and producer counts. Each
//! combination is run `ROUNDS` times; min/avg/max throughput is printed to
//! stdout.
//!
//! Producers are spawned back to back (no spawn delay) so the queue, not the
//! arrival curve, is the bottleneck. No tracing subscriber is installed, so
//! log macros cost next to nothing.
//!
//! # Usage
//!
//! ```text
//! cargo run --bin ingestion_bench --release
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use ingestion::adapters::SequentialIds;
use ingestion::{Coordinator, PipelineConfig};
use producer::SpawnDelay;

// ---------------------------------------------------------------------------
// Benchmark parameters
// ---------------------------------------------------------------------------

/// Number of pipeline runs averaged per combination.
const ROUNDS: u32 = 5;

/// Queue capacities exercised.
const CAPACITIES: &[usize] = &[1, 16, 256];

/// Producer counts exercised.
const PRODUCERS: &[usize] = &[1_000, 10_000, 50_000];

/// Short sampling period keeps the sampler's final tick from dominating run time.
const SAMPLE_INTERVAL: Duration = Duration::from_millis(10);

// ---------------------------------------------------------------------------
// Single pipeline run
// ---------------------------------------------------------------------------

/// Run the pipeline once; return `(total_tx, effective_tps)`.
///
/// # Errors
///
/// Returns an error if the configuration is rejected or any task failed.
async fn run_bench(capacity: usize, producers: usize) -> anyhow::Result<(u64, f64)> {
    let config = PipelineConfig::builder()
        .queue_capacity(capacity)
        .producers(producers)
        .spawn_delay(SpawnDelay::None)
        .sample_interval(SAMPLE_INTERVAL)
        .build()
        .context("failed to build bench config")?;

    let report = Coordinator::new(config).run(Arc::new(SequentialIds::new())).await;
    if let Some(failure) = report.failures.first() {
        anyhow::bail!("bench run failed: {failure}");
    }
    Ok((report.total_transactions, report.effective_tps))
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("bench: ROUNDS={ROUNDS}  (no spawn delay)");
    println!(
        "{:>10} | {:>10} | {:>10} | {:>12} | {:>12} | {:>12}",
        "capacity", "producers", "total_tx", "min tx/s", "avg tx/s", "max tx/s"
    );
    println!("{:-<11}+{:-<12}+{:-<12}+{:-<14}+{:-<14}+{:-<13}", "", "", "", "", "", "");

    for &capacity in CAPACITIES {
        for &producers in PRODUCERS {
            let mut total_tx_first = 0u64;
            let mut min_tps = f64::MAX;
            let mut max_tps = 0.0_f64;
            let mut sum_tps = 0.0_f64;

            for round in 0..ROUNDS {
                let (total_tx, tps) = run_bench(capacity, producers).await?;
                if round == 0 {
                    total_tx_first = total_tx;
                }
                min_tps = min_tps.min(tps);
                max_tps = max_tps.max(tps);
                sum_tps += tps;
            }

            let avg_tps = sum_tps / f64::from(ROUNDS);

            println!(
                "{:>10} | {:>10} | {:>10} | {:>12.0} | {:>12.0} | {:>12.0}",
                capacity, producers, total_tx_first, min_tps, avg_tps, max_tps,
            );
        }
    }

    Ok(())
}

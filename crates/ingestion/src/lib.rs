// Rust guideline compliant 2026-10-19

//! Transaction-ingestion pipeline: wiring, configuration and adapters.
//!
//! [`Coordinator`] starts the recorder and the throughput sampler, runs the
//! producer pool against a bounded queue from [`adapters`], shuts
//! everything down in order and returns a `reporter::PipelineReport`.

pub mod adapters;
pub mod config;
pub mod coordinator;

pub use config::{ConfigError, PipelineConfig, PipelineConfigBuilder};
pub use coordinator::Coordinator;

// Rust guideline compliant 2026-10-19

//! Adapters (secondary ports) for the ingestion pipeline.
//!
//! Each sub-module implements one or more hexagonal port traits defined in the
//! `domain` crate.

pub mod bounded_queue;
pub mod ids;

pub use bounded_queue::{QueueReader, QueueWriter, bounded_queue};
pub use ids::{AlphanumericIds, SequentialIds, UuidIds};

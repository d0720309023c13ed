// Rust guideline compliant 2026-10-19

//! Adapters for the `IdGenerator` port.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use domain::IdGenerator;
use rand::{Rng as _, SeedableRng, rngs::StdRng};

/// Random UUID v4 strings. The default generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl UuidIds {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl IdGenerator for UuidIds {
    fn generate(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Random `[a-zA-Z0-9]` strings of 1 to 99 characters.
///
/// Short strings collide easily; use [`UuidIds`] when uniqueness matters more
/// than id shape.
#[derive(Debug)]
pub struct AlphanumericIds {
    rng: Mutex<StdRng>,
}

impl AlphanumericIds {
    /// Seeds from `seed` if set, otherwise from the OS.
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { rng: Mutex::new(rng) }
    }
}

impl IdGenerator for AlphanumericIds {
    fn generate(&self) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let len = rng.random_range(1..100);
        (0..len)
            .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
            .collect()
    }
}

/// Deterministic `tx-000001`, `tx-000002`, ... ids in call order.
#[derive(Debug, Default)]
pub struct SequentialIds {
    issued: AtomicU64,
}

impl SequentialIds {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn generate(&self) -> String {
        let n = self.issued.fetch_add(1, Ordering::Relaxed) + 1;
        format!("tx-{n:06}")
    }
}

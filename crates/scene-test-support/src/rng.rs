//! Test RNGs — deterministic `DeterministicRng` implementations for tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scene_core::rng::DeterministicRng;

/// An RNG that returns values from a predetermined sequence, cycling when
/// exhausted. `next_i32` reuses the same values.
#[derive(Debug)]
pub struct SequenceRng {
    values: Vec<u32>,
    index: usize,
}

impl SequenceRng {
    /// Create a new `SequenceRng` with the given values.
    ///
    /// # Panics
    ///
    /// Panics if `values` is empty.
    #[must_use]
    pub fn new(values: Vec<u32>) -> Self {
        assert!(!values.is_empty(), "SequenceRng needs at least one value");
        Self { values, index: 0 }
    }

    fn next_value(&mut self) -> u32 {
        let val = self.values[self.index % self.values.len()];
        self.index += 1;
        val
    }
}

impl DeterministicRng for SequenceRng {
    fn next_u32_range(&mut self, _min: u32, _max: u32) -> u32 {
        self.next_value()
    }

    #[allow(clippy::cast_possible_wrap)]
    fn next_i32(&mut self) -> i32 {
        self.next_value() as i32
    }
}

/// A seeded `StdRng`. Stress tests log the seed so a failing trial can be
/// rerun exactly.
#[derive(Debug)]
pub struct SeededRng {
    seed: u64,
    inner: StdRng,
}

impl SeededRng {
    /// Create an RNG from a fixed seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: StdRng::seed_from_u64(seed),
        }
    }

    /// Create an RNG from a fresh random seed.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(rand::rng().random())
    }

    /// The seed this RNG was created with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl DeterministicRng for SeededRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        self.inner.random_range(min..=max)
    }

    fn next_i32(&mut self) -> i32 {
        self.inner.random()
    }
}

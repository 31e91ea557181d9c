//! Random number generator abstraction for determinism.
//!
//! Script generation for stress runs draws from this trait so a failing
//! trial can be reproduced from its seed.

/// Abstraction over random number generation.
pub trait DeterministicRng: Send + Sync {
    /// Generate a random `u32` in the range `[min, max]` inclusive.
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32;

    /// Generate a random `i32` over the full range.
    fn next_i32(&mut self) -> i32;
}

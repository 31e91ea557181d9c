//! Scene Core — shared abstractions for the scene replay engine.
//!
//! This crate defines the speaker roster, script lines, the sink trait that
//! replay writes through, the turn observer hook, and the determinism seams
//! (`Clock`, `DeterministicRng`). It contains no concurrency code.

pub mod clock;
pub mod error;
pub mod line;
pub mod observer;
pub mod rng;
pub mod sink;
pub mod speaker;

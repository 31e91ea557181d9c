//! Replay data model: turns, gates, and run summaries.

pub mod gate;
pub mod summary;
pub mod turns;

//! Replay orchestration: the coordinator and the per-speaker workers.

pub mod coordinator;
mod worker;

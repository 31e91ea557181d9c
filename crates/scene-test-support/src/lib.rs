//! Shared test mocks and utilities for the scene replay engine.

mod clock;
mod observer;
mod rng;
mod script;
mod sink;

pub use clock::{FixedClock, SteppingClock};
pub use observer::{TurnWindow, TurnWindowRecorder};
pub use rng::{SeededRng, SequenceRng};
pub use script::{generate_script, render_script};
pub use sink::{FailingSink, RecordingSink};

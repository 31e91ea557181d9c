//! Hook for watching replay turns from outside the sink.

use crate::speaker::Speaker;

/// Told when a worker takes the turn and when it gives it up.
///
/// `turn_started` fires once the worker's gate has opened and
/// `turn_finished` fires before the next gate is signalled, so in a correct
/// replay no two windows are ever open at once.
pub trait TurnObserver: Send + Sync {
    /// The worker for `speaker` now holds turn `position`.
    fn turn_started(&self, speaker: &Speaker, position: usize);

    /// The worker for `speaker` is about to hand off turn `position`.
    fn turn_finished(&self, speaker: &Speaker, position: usize);
}

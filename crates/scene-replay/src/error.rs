//! Replay error types.

use std::time::Duration;

use scene_core::speaker::Speaker;
use thiserror::Error;

/// Why a turn index cannot be replayed without stalling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainDefect {
    /// A successor names a speaker the index has no turn list for.
    #[error("turn {position} hands off to {speaker}, who has no turn list")]
    UnknownSuccessor {
        /// Global position of the turn being handed off to.
        position: usize,
        /// The missing speaker.
        speaker: Speaker,
    },

    /// A successor's turn list is already exhausted.
    #[error("turn {position} belongs to {speaker}, whose turns are exhausted")]
    MissingTurn {
        /// Global position the chain expected next.
        position: usize,
        /// Speaker expected to own it.
        speaker: Speaker,
    },

    /// The head of a successor's turn list is not the next turn in global order.
    #[error("{speaker} holds turn {found} where turn {expected} was expected")]
    OutOfOrder {
        /// Speaker whose head turn is misplaced.
        speaker: Speaker,
        /// Global position the chain expected.
        expected: usize,
        /// Global position actually found.
        found: usize,
    },

    /// The chain ended before visiting every turn.
    #[error("handoff chain reaches {reached} of {total} turns")]
    Unreached {
        /// Turns visited by following successors.
        reached: usize,
        /// Turns in the index.
        total: usize,
    },
}

/// Errors raised while replaying a script.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// The turn index would strand a worker; nothing was replayed.
    #[error("turn index is not replayable: {0}")]
    BrokenChain(#[from] ChainDefect),

    /// A worker's wait was cancelled before its turn came.
    #[error("{speaker} was interrupted waiting for turn {position}")]
    Interrupted {
        /// Speaker whose worker was waiting.
        speaker: Speaker,
        /// Global position of the turn it was waiting to emit.
        position: usize,
    },

    /// A worker waited through a whole handoff deadline in which no handoff
    /// happened anywhere in the run.
    #[error("handoff to {speaker} for turn {position} stalled after {waited:?}")]
    StuckHandoff {
        /// Speaker whose worker was waiting.
        speaker: Speaker,
        /// Global position of the turn it was waiting to emit.
        position: usize,
        /// How long it waited.
        waited: Duration,
    },

    /// A gate refused the baton.
    #[error("{from} could not hand turn {position} to {to}: {reason}")]
    HandoffRejected {
        /// Speaker handing off.
        from: Speaker,
        /// Name of the receiving gate.
        to: String,
        /// Global position of the turn just emitted.
        position: usize,
        /// What the gate reported.
        reason: &'static str,
    },

    /// Writing a line failed; later lines were not written.
    #[error("failed to emit turn {position} for {speaker}: {source}")]
    Sink {
        /// Speaker whose line failed.
        speaker: Speaker,
        /// Global position of the failed line.
        position: usize,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Flushing the sink after the last line failed.
    #[error("failed to flush output: {0}")]
    Flush(#[source] std::io::Error),

    /// A worker task panicked.
    #[error("worker for {speaker} panicked: {detail}")]
    WorkerPanicked {
        /// Speaker whose worker panicked.
        speaker: Speaker,
        /// Panic description from the runtime.
        detail: String,
    },

    /// Every worker finished cleanly but the baton never reached the end.
    #[error("replay finished without returning the output sink")]
    BatonLost,

    /// More than one worker failed. Root causes come before interruptions.
    #[error("{}", describe_failures(.0))]
    Multiple(Vec<ReplayError>),
}

impl ReplayError {
    /// Folds per-worker failures into one error, root causes first.
    /// `None` when nothing failed.
    pub(crate) fn from_failures(mut failures: Vec<ReplayError>) -> Option<Self> {
        failures.sort_by_key(ReplayError::is_interruption);
        match failures.len() {
            0 => None,
            1 => failures.pop(),
            _ => Some(ReplayError::Multiple(failures)),
        }
    }

    /// The individual failures this error stands for.
    #[must_use]
    pub fn causes(&self) -> &[ReplayError] {
        match self {
            ReplayError::Multiple(failures) => failures,
            other => std::slice::from_ref(other),
        }
    }

    /// `true` for waits that were cancelled rather than failing on their own.
    #[must_use]
    pub fn is_interruption(&self) -> bool {
        matches!(self, ReplayError::Interrupted { .. })
    }
}

fn describe_failures(failures: &[ReplayError]) -> String {
    match failures.first() {
        Some(first) => format!("{} replay failures, first: {first}", failures.len()),
        None => "no replay failures".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use scene_core::speaker::Roster;

    use super::*;

    fn speaker(name: &str) -> Speaker {
        Roster::default().get(name).unwrap().clone()
    }

    #[test]
    fn test_from_failures_unwraps_single_failure() {
        let err = ReplayError::from_failures(vec![ReplayError::BatonLost]).unwrap();

        assert!(matches!(err, ReplayError::BatonLost));
        assert_eq!(err.causes().len(), 1);
    }

    #[test]
    fn test_from_failures_puts_root_cause_before_interruptions() {
        // Arrange
        let failures = vec![
            ReplayError::Interrupted {
                speaker: speaker("Joey"),
                position: 4,
            },
            ReplayError::StuckHandoff {
                speaker: speaker("Ross"),
                position: 2,
                waited: Duration::from_millis(50),
            },
        ];

        // Act
        let err = ReplayError::from_failures(failures).unwrap();

        // Assert
        let causes = err.causes();
        assert_eq!(causes.len(), 2);
        assert!(matches!(causes[0], ReplayError::StuckHandoff { .. }));
        assert!(causes[1].is_interruption());
        assert!(err.to_string().starts_with("2 replay failures, first: handoff to Ross"));
    }

    #[test]
    fn test_from_failures_with_nothing_failed_is_none() {
        assert!(ReplayError::from_failures(Vec::new()).is_none());
    }

    #[test]
    fn test_empty_multiple_still_displays() {
        let err = ReplayError::Multiple(Vec::new());

        assert_eq!(err.to_string(), "no replay failures");
        assert!(err.causes().is_empty());
    }
}

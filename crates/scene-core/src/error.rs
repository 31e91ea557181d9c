//! Script and roster error types.

use thiserror::Error;

/// Top-level error type for everything that happens before replay starts.
#[derive(Debug, Error)]
pub enum SceneError {
    /// A line has no `": "` separator between speaker and text.
    #[error("malformed line {line_number}: {line:?} (expected `<speaker>: <text>`)")]
    MalformedLine {
        /// 1-based line number in the input.
        line_number: usize,
        /// The offending line, verbatim.
        line: String,
    },

    /// A line names a speaker outside the roster.
    #[error("unknown speaker {speaker:?} on line {line_number}")]
    UnknownSpeaker {
        /// 1-based line number in the input.
        line_number: usize,
        /// The speaker name as written.
        speaker: String,
    },

    /// The roster itself is unusable.
    #[error("invalid roster: {0}")]
    InvalidRoster(String),

    /// Reading the script failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

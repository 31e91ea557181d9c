//! Scene replay — per-speaker workers and the turn handoff protocol.
//!
//! Every speaker gets its own concurrent worker. Output order is fixed by
//! handing a single baton from turn to turn: each turn knows which speaker
//! goes next and signals that speaker's gate when it is done. No lock is held
//! around the output.

pub mod application;
pub mod domain;
pub mod error;

use scene_core::line::ScriptLine;
use scene_core::sink::LineSink;
use scene_core::speaker::Roster;
use tokio_util::sync::CancellationToken;

pub use application::coordinator::{Coordinator, ReplayConfig, ReplayOutcome};
pub use domain::summary::ReplaySummary;
pub use domain::turns::{Turn, TurnIndex};
pub use error::{ChainDefect, ReplayError};

/// Indexes `lines` and replays them into `sink`.
///
/// # Errors
///
/// Returns `ReplayError` if any worker fails, the run is cancelled, or the
/// sink cannot be written or flushed.
pub async fn replay_script<S: LineSink>(
    roster: &Roster,
    lines: &[ScriptLine],
    sink: S,
    config: ReplayConfig,
    cancel: CancellationToken,
) -> Result<ReplayOutcome<S>, ReplayError> {
    let index = TurnIndex::build(roster, lines);
    Coordinator::new(index, config)?.run(sink, cancel).await
}

//! Summary of a completed replay.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// What a replay run did, suitable for structured logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    /// Correlation ID attached to every log line of the run.
    pub run_id: Uuid,
    /// Lines written to the sink.
    pub lines_emitted: usize,
    /// Lines per roster speaker, including speakers with none.
    pub lines_per_speaker: BTreeMap<String, usize>,
    /// When the coordinator started its workers.
    pub started_at: DateTime<Utc>,
    /// When the last worker finished and the sink was flushed.
    pub finished_at: DateTime<Utc>,
}

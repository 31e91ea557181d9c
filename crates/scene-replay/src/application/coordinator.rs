//! Handoff coordinator: owns the gates, starts the workers, kicks off the
//! first speaker, and collects the outcome.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use scene_core::clock::{Clock, SystemClock};
use scene_core::observer::TurnObserver;
use scene_core::sink::LineSink;
use scene_core::speaker::Speaker;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::application::worker::{Baton, Handoffs, Worker};
use crate::domain::gate::{GateSignal, GateWaiter, gate};
use crate::domain::summary::ReplaySummary;
use crate::domain::turns::{Turn, TurnIndex};
use crate::error::ReplayError;

/// Default watchdog deadline: how long a run may go without any handoff.
pub const DEFAULT_HANDOFF_TIMEOUT: Duration = Duration::from_secs(30);

/// Tunables for a replay run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayConfig {
    /// How long a waiting worker tolerates a run with no handoff anywhere
    /// before declaring it stuck. Every completed handoff restarts the
    /// deadline, so a slow but moving chain never trips it. `None` waits
    /// indefinitely.
    pub handoff_timeout: Option<Duration>,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            handoff_timeout: Some(DEFAULT_HANDOFF_TIMEOUT),
        }
    }
}

/// A finished replay: the sink, flushed, and what happened.
#[derive(Debug)]
pub struct ReplayOutcome<S> {
    /// The sink every line was written to.
    pub sink: S,
    /// Run statistics.
    pub summary: ReplaySummary,
}

struct WorkerSlot<S> {
    speaker: Speaker,
    turns: Vec<Turn>,
    gate: GateWaiter<Baton<S>>,
}

/// Runs one replay. Built once from a turn index; only gate state changes
/// while it runs.
pub struct Coordinator<S> {
    run_id: Uuid,
    slots: Vec<WorkerSlot<S>>,
    signals: HashMap<Speaker, GateSignal<Baton<S>>>,
    finish_signal: GateSignal<Baton<S>>,
    finish: GateWaiter<Baton<S>>,
    first_speaker: Option<Speaker>,
    lines_per_speaker: BTreeMap<String, usize>,
    total: usize,
    config: ReplayConfig,
    clock: Arc<dyn Clock>,
    observer: Option<Arc<dyn TurnObserver>>,
}

impl<S: LineSink> Coordinator<S> {
    /// Creates one idle gate per speaker in the index.
    ///
    /// # Errors
    ///
    /// Returns `ReplayError::BrokenChain` if following successors from the
    /// first speaker would not visit every turn exactly once in order.
    pub fn new(index: TurnIndex, config: ReplayConfig) -> Result<Self, ReplayError> {
        index.check_chain()?;
        Ok(Self::new_unchecked(index, config))
    }

    pub(crate) fn new_unchecked(index: TurnIndex, config: ReplayConfig) -> Self {
        let total = index.len();
        let (speakers, first_speaker) = index.into_parts();

        let mut signals = HashMap::with_capacity(speakers.len());
        let mut slots = Vec::with_capacity(speakers.len());
        let mut lines_per_speaker = BTreeMap::new();
        for (speaker, turns) in speakers {
            let (signal, waiter) = gate();
            signals.insert(speaker.clone(), signal);
            lines_per_speaker.insert(speaker.to_string(), turns.len());
            slots.push(WorkerSlot {
                speaker,
                turns,
                gate: waiter,
            });
        }
        let (finish_signal, finish) = gate();

        Self {
            run_id: Uuid::new_v4(),
            slots,
            signals,
            finish_signal,
            finish,
            first_speaker,
            lines_per_speaker,
            total,
            config,
            clock: Arc::new(SystemClock),
            observer: None,
        }
    }

    /// Replaces the clock used for summary timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Reports every worker's turn window to `observer`.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn TurnObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Correlation ID for this run.
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Starts one worker per speaker, signals the first speaker's gate once,
    /// and waits for every worker to finish.
    ///
    /// Failures are collected from all workers before anything is reported;
    /// cancelling `cancel` interrupts every pending wait.
    ///
    /// # Errors
    ///
    /// Returns the single failure, or `ReplayError::Multiple` when several
    /// workers failed. A sink write failure is reported as
    /// `ReplayError::Sink` once the chain has drained.
    #[instrument(skip_all, fields(run_id = %self.run_id, turns = self.total))]
    pub async fn run(self, sink: S, cancel: CancellationToken) -> Result<ReplayOutcome<S>, ReplayError> {
        let started_at = self.clock.now();
        let Self {
            run_id,
            slots,
            signals,
            finish_signal,
            mut finish,
            first_speaker,
            lines_per_speaker,
            config,
            clock,
            observer,
            ..
        } = self;
        let handoffs = Arc::new(Handoffs::new(signals, finish_signal, observer));

        // The first gate is armed before any worker runs; an empty script
        // never arms one and the baton stays here.
        let mut failures = Vec::new();
        let idle = match &first_speaker {
            Some(first) => {
                if let Err(err) = handoffs.kickoff(first, Baton::new(sink)) {
                    warn!(error = %err, "kickoff failed");
                    cancel.cancel();
                    failures.push(err);
                }
                None
            }
            None => Some(Baton::new(sink)),
        };

        let mut tasks = Vec::with_capacity(slots.len());
        for slot in slots {
            let worker = Worker::new(
                slot.speaker.clone(),
                slot.turns,
                slot.gate,
                Arc::clone(&handoffs),
                config.handoff_timeout,
                cancel.clone(),
            );
            tasks.push((slot.speaker, tokio::spawn(worker.run())));
        }
        drop(handoffs);

        for (speaker, task) in tasks {
            match task.await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => failures.push(err),
                Err(join_err) => {
                    cancel.cancel();
                    failures.push(ReplayError::WorkerPanicked {
                        speaker,
                        detail: join_err.to_string(),
                    });
                }
            }
        }

        if let Some(err) = ReplayError::from_failures(failures) {
            warn!(error = %err, "replay failed");
            return Err(err);
        }

        let mut baton = idle.or_else(|| finish.try_take()).ok_or(ReplayError::BatonLost)?;
        if let Some(failure) = baton.failure.take() {
            return Err(ReplayError::Sink {
                speaker: failure.speaker,
                position: failure.position,
                source: failure.source,
            });
        }
        baton.sink.flush().map_err(ReplayError::Flush)?;

        let summary = ReplaySummary {
            run_id,
            lines_emitted: baton.emitted,
            lines_per_speaker,
            started_at,
            finished_at: clock.now(),
        };
        info!(lines = summary.lines_emitted, "replay finished");

        Ok(ReplayOutcome {
            sink: baton.sink,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use scene_core::speaker::Roster;
    use scene_test_support::{FixedClock, RecordingSink, SteppingClock};

    use super::*;

    fn speaker(name: &str) -> Speaker {
        Roster::default().get(name).unwrap().clone()
    }

    /// Ross hands off to Rachel, but Rachel's list claims two turns and the
    /// second is never handed to her.
    fn stalling_index() -> TurnIndex {
        let ross = speaker("Ross");
        let rachel = speaker("Rachel");
        TurnIndex::from_parts(
            vec![
                (ross.clone(), vec![Turn::new(0, "hi", Some(rachel.clone()))]),
                (
                    rachel,
                    vec![Turn::new(1, "hey", None), Turn::new(2, "anyone?", None)],
                ),
            ],
            Some(ross),
        )
    }

    #[test]
    fn test_new_rejects_broken_chain() {
        let result = Coordinator::<RecordingSink>::new(stalling_index(), ReplayConfig::default());

        assert!(matches!(result, Err(ReplayError::BrokenChain(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_run_returns_sink_and_summary() {
        // Arrange
        let roster = Roster::default();
        let lines = scene_script::parse_script("Ross: hi\nRachel: hey\nRoss: bye", &roster).unwrap();
        let fixed_now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let coordinator = Coordinator::new(TurnIndex::build(&roster, &lines), ReplayConfig::default())
            .unwrap()
            .with_clock(Arc::new(FixedClock(fixed_now)));
        let run_id = coordinator.run_id();

        // Act
        let outcome = coordinator
            .run(RecordingSink::new(), CancellationToken::new())
            .await
            .unwrap();

        // Assert
        assert_eq!(outcome.sink.lines(), ["Ross: hi", "Rachel: hey", "Ross: bye"]);
        assert_eq!(outcome.sink.flushes(), 1);
        let summary = outcome.summary;
        assert_eq!(summary.run_id, run_id);
        assert_eq!(summary.lines_emitted, 3);
        assert_eq!(summary.lines_per_speaker["Ross"], 2);
        assert_eq!(summary.lines_per_speaker["Rachel"], 1);
        assert_eq!(summary.lines_per_speaker["Joey"], 0);
        assert_eq!(summary.started_at, fixed_now);
        assert_eq!(summary.finished_at, fixed_now);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_summary_timestamps_bracket_the_run() {
        // Arrange
        let roster = Roster::default();
        let lines = scene_script::parse_script("Phoebe: smelly cat", &roster).unwrap();
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let clock = SteppingClock::new(start, chrono::Duration::seconds(1));
        let coordinator = Coordinator::new(TurnIndex::build(&roster, &lines), ReplayConfig::default())
            .unwrap()
            .with_clock(Arc::new(clock));

        // Act
        let outcome = coordinator
            .run(RecordingSink::new(), CancellationToken::new())
            .await
            .unwrap();

        // Assert
        assert_eq!(outcome.summary.started_at, start);
        assert_eq!(
            outcome.summary.finished_at,
            start + chrono::Duration::seconds(1)
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_watchdog_reports_stuck_handoff() {
        // Arrange
        let config = ReplayConfig {
            handoff_timeout: Some(Duration::from_millis(50)),
        };
        let coordinator = Coordinator::new_unchecked(stalling_index(), config);

        // Act
        let err = coordinator
            .run(RecordingSink::new(), CancellationToken::new())
            .await
            .unwrap_err();

        // Assert
        match err {
            ReplayError::StuckHandoff {
                speaker, position, ..
            } => {
                assert_eq!(speaker.name(), "Rachel");
                assert_eq!(position, 2);
            }
            other => panic!("expected StuckHandoff, got {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_cancellation_interrupts_pending_wait() {
        // Arrange
        let config = ReplayConfig {
            handoff_timeout: None,
        };
        let coordinator = Coordinator::new_unchecked(stalling_index(), config);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        // Act
        let err = coordinator
            .run(RecordingSink::new(), cancel)
            .await
            .unwrap_err();

        // Assert
        match err {
            ReplayError::Interrupted { speaker, position } => {
                assert_eq!(speaker.name(), "Rachel");
                assert_eq!(position, 2);
            }
            other => panic!("expected Interrupted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cancelled_before_start_interrupts_first_speaker() {
        let roster = Roster::default();
        let lines = scene_script::parse_script("Joey: how you doin'", &roster).unwrap();
        let coordinator: Coordinator<RecordingSink> =
            Coordinator::new(TurnIndex::build(&roster, &lines), ReplayConfig::default()).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = coordinator.run(RecordingSink::new(), cancel).await.unwrap_err();

        match err {
            ReplayError::Interrupted { speaker, position } => {
                assert_eq!(speaker.name(), "Joey");
                assert_eq!(position, 0);
            }
            other => panic!("expected Interrupted, got {other:?}"),
        }
    }
}

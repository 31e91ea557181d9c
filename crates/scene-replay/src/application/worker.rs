//! Replay workers and the baton they pass.
//!
//! The baton owns the sink. A worker can only write after its gate hands it
//! the baton, and gives it up by signalling the next speaker's gate, so at
//! most one worker is ever between wait and signal.

use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use scene_core::observer::TurnObserver;
use scene_core::sink::LineSink;
use scene_core::speaker::Speaker;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::domain::gate::{GateSignal, GateWaiter};
use crate::domain::turns::Turn;
use crate::error::ReplayError;

/// A sink write that failed, kept until the run reports.
#[derive(Debug)]
pub(crate) struct SinkFailure {
    pub(crate) speaker: Speaker,
    pub(crate) position: usize,
    pub(crate) source: io::Error,
}

/// The right to emit, together with the sink to emit into.
pub(crate) struct Baton<S> {
    pub(crate) sink: S,
    pub(crate) emitted: usize,
    pub(crate) failure: Option<SinkFailure>,
}

impl<S: LineSink> Baton<S> {
    pub(crate) fn new(sink: S) -> Self {
        Self {
            sink,
            emitted: 0,
            failure: None,
        }
    }

    /// Writes the turn unless an earlier write failed. After a failure the
    /// baton keeps travelling so every gate still drains, but nothing more is
    /// written.
    fn emit(&mut self, speaker: &Speaker, turn: &Turn) {
        if self.failure.is_some() {
            trace!(%speaker, position = turn.position(), "output suppressed after sink failure");
            return;
        }
        match self.sink.write_line(speaker, turn.text()) {
            Ok(()) => self.emitted += 1,
            Err(source) => {
                warn!(%speaker, position = turn.position(), error = %source, "sink write failed");
                self.failure = Some(SinkFailure {
                    speaker: speaker.clone(),
                    position: turn.position(),
                    source,
                });
            }
        }
    }
}

/// Signalling halves of every speaker's gate, plus the finish gate that
/// receives the baton after the last turn.
///
/// Every completed handoff bumps a run-wide counter; waiting workers restart
/// their watchdog whenever it moves.
pub(crate) struct Handoffs<S> {
    gates: HashMap<Speaker, GateSignal<Baton<S>>>,
    finish: GateSignal<Baton<S>>,
    progress: watch::Sender<u64>,
    observer: Option<Arc<dyn TurnObserver>>,
}

impl<S: LineSink> Handoffs<S> {
    pub(crate) fn new(
        gates: HashMap<Speaker, GateSignal<Baton<S>>>,
        finish: GateSignal<Baton<S>>,
        observer: Option<Arc<dyn TurnObserver>>,
    ) -> Self {
        let (progress, _) = watch::channel(0);
        Self {
            gates,
            finish,
            progress,
            observer,
        }
    }

    /// Receiver that changes on every completed handoff.
    pub(crate) fn watch_progress(&self) -> watch::Receiver<u64> {
        self.progress.subscribe()
    }

    /// Gives the baton to whoever owns the turn after `turn`, or to the
    /// finish gate.
    fn pass(&self, from: &Speaker, turn: &Turn, baton: Baton<S>) -> Result<(), ReplayError> {
        match turn.successor() {
            Some(next) => self.signal(from, turn.position(), next, baton)?,
            None => self
                .finish
                .signal(baton)
                .map_err(|err| ReplayError::HandoffRejected {
                    from: from.clone(),
                    to: "finish".to_owned(),
                    position: turn.position(),
                    reason: err.reason(),
                })?,
        }
        self.progress.send_modify(|handoffs| *handoffs += 1);
        Ok(())
    }

    /// Arms the first speaker's gate before any worker runs.
    pub(crate) fn kickoff(&self, first: &Speaker, baton: Baton<S>) -> Result<(), ReplayError> {
        let gate = self.gates.get(first).ok_or_else(|| ReplayError::HandoffRejected {
            from: first.clone(),
            to: first.to_string(),
            position: 0,
            reason: "no gate for speaker",
        })?;
        gate.signal(baton).map_err(|err| ReplayError::HandoffRejected {
            from: first.clone(),
            to: first.to_string(),
            position: 0,
            reason: err.reason(),
        })
    }

    /// Arms `to`'s gate.
    fn signal(
        &self,
        from: &Speaker,
        position: usize,
        to: &Speaker,
        baton: Baton<S>,
    ) -> Result<(), ReplayError> {
        let rejected = |reason: &'static str| ReplayError::HandoffRejected {
            from: from.clone(),
            to: to.to_string(),
            position,
            reason,
        };
        let gate = self.gates.get(to).ok_or_else(|| rejected("no gate for speaker"))?;
        gate.signal(baton).map_err(|err| rejected(err.reason()))
    }

    fn turn_started(&self, speaker: &Speaker, position: usize) {
        if let Some(observer) = &self.observer {
            observer.turn_started(speaker, position);
        }
    }

    fn turn_finished(&self, speaker: &Speaker, position: usize) {
        if let Some(observer) = &self.observer {
            observer.turn_finished(speaker, position);
        }
    }
}

/// One speaker's replay task.
pub(crate) struct Worker<S> {
    speaker: Speaker,
    turns: Vec<Turn>,
    gate: GateWaiter<Baton<S>>,
    progress: watch::Receiver<u64>,
    handoffs: Arc<Handoffs<S>>,
    handoff_timeout: Option<Duration>,
    cancel: CancellationToken,
}

impl<S: LineSink> Worker<S> {
    pub(crate) fn new(
        speaker: Speaker,
        turns: Vec<Turn>,
        gate: GateWaiter<Baton<S>>,
        handoffs: Arc<Handoffs<S>>,
        handoff_timeout: Option<Duration>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            speaker,
            turns,
            gate,
            progress: handoffs.watch_progress(),
            handoffs,
            handoff_timeout,
            cancel,
        }
    }

    /// Replays every turn: wait, emit, hand off. Any error, or a panic,
    /// cancels the run so peers stop waiting.
    pub(crate) async fn run(mut self) -> Result<(), ReplayError> {
        let guard = self.cancel.clone().drop_guard();
        let turns = std::mem::take(&mut self.turns);

        for turn in &turns {
            let mut baton = self.wait(turn.position()).await?;
            trace!(speaker = %self.speaker, position = turn.position(), "turn acquired");
            self.handoffs.turn_started(&self.speaker, turn.position());
            baton.emit(&self.speaker, turn);
            self.handoffs.turn_finished(&self.speaker, turn.position());
            self.handoffs.pass(&self.speaker, turn, baton)?;
        }

        guard.disarm();
        debug!(speaker = %self.speaker, turns = turns.len(), "worker finished");
        Ok(())
    }

    async fn wait(&mut self, position: usize) -> Result<Baton<S>, ReplayError> {
        let received = tokio::select! {
            biased;
            () = self.cancel.cancelled() => None,
            received = wait_with_watchdog(
                &mut self.gate,
                &mut self.progress,
                self.handoff_timeout,
            ) => Some(received),
        };

        match received {
            Some(Ok(Some(baton))) => Ok(baton),
            Some(Err(waited)) => {
                warn!(speaker = %self.speaker, position, ?waited, "handoff watchdog expired");
                Err(ReplayError::StuckHandoff {
                    speaker: self.speaker.clone(),
                    position,
                    waited,
                })
            }
            None | Some(Ok(None)) => {
                debug!(speaker = %self.speaker, position, "wait interrupted");
                Err(ReplayError::Interrupted {
                    speaker: self.speaker.clone(),
                    position,
                })
            }
        }
    }
}

/// Waits for the gate. With a deadline, gives up once `deadline` passes
/// without any handoff anywhere in the run; each handoff restarts it.
async fn wait_with_watchdog<T>(
    gate: &mut GateWaiter<T>,
    progress: &mut watch::Receiver<u64>,
    deadline: Option<Duration>,
) -> Result<Option<T>, Duration> {
    let Some(deadline) = deadline else {
        return Ok(gate.wait().await);
    };
    loop {
        tokio::select! {
            biased;
            received = gate.wait() => return Ok(received),
            Ok(()) = progress.changed() => {}
            () = tokio::time::sleep(deadline) => return Err(deadline),
        }
    }
}

//! Test observer — records every worker's turn window from outside the sink.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, ThreadId};

use scene_core::observer::TurnObserver;
use scene_core::speaker::Speaker;

/// One closed turn window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnWindow {
    /// Speaker who held the turn.
    pub speaker: Speaker,
    /// Global position of the turn.
    pub position: usize,
    /// Thread that held the turn.
    pub thread: ThreadId,
}

/// Counts how many turn windows are open at once and records each window
/// as it closes. Shared between workers through an `Arc`, so two workers
/// inside their windows together show up as `max_open() > 1`.
#[derive(Debug, Default)]
pub struct TurnWindowRecorder {
    open: AtomicUsize,
    max_open: AtomicUsize,
    windows: Mutex<Vec<TurnWindow>>,
}

impl TurnWindowRecorder {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Largest number of windows ever open at the same time.
    #[must_use]
    pub fn max_open(&self) -> usize {
        self.max_open.load(Ordering::SeqCst)
    }

    /// Windows still open.
    #[must_use]
    pub fn open(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    /// Closed windows in the order they closed.
    #[must_use]
    pub fn windows(&self) -> Vec<TurnWindow> {
        self.windows.lock().unwrap().clone()
    }

    /// Positions of the closed windows in closing order.
    #[must_use]
    pub fn positions(&self) -> Vec<usize> {
        self.windows.lock().unwrap().iter().map(|w| w.position).collect()
    }

    /// Number of distinct threads that held a turn.
    #[must_use]
    pub fn distinct_threads(&self) -> usize {
        let windows = self.windows.lock().unwrap();
        windows.iter().map(|w| w.thread).collect::<HashSet<_>>().len()
    }
}

impl TurnObserver for TurnWindowRecorder {
    fn turn_started(&self, _speaker: &Speaker, _position: usize) {
        let now_open = self.open.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_open.fetch_max(now_open, Ordering::SeqCst);
        // Widen the window so a broken handoff has room to overlap.
        for _ in 0..3 {
            thread::yield_now();
        }
    }

    fn turn_finished(&self, speaker: &Speaker, position: usize) {
        self.windows.lock().unwrap().push(TurnWindow {
            speaker: speaker.clone(),
            position,
            thread: thread::current().id(),
        });
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

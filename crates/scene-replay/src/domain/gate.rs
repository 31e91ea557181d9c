//! Single-slot rendezvous gate.
//!
//! A gate is either idle or armed with exactly one value. `signal` arms it
//! without blocking and is remembered if nobody is waiting yet; `wait` blocks
//! until armed, then takes the value and leaves the gate idle again. The
//! signalling half can be cloned and shared; the waiting half belongs to one
//! worker.

use std::fmt;

use tokio::sync::mpsc::{self, error::TrySendError};

/// Creates an idle gate.
#[must_use]
pub fn gate<T>() -> (GateSignal<T>, GateWaiter<T>) {
    let (tx, rx) = mpsc::channel(1);
    (GateSignal { tx }, GateWaiter { rx })
}

/// Why a signal was refused. The value is handed back either way.
pub enum GateError<T> {
    /// The gate already holds an unconsumed signal.
    Armed(T),
    /// The waiting half has been dropped.
    Closed(T),
}

impl<T> GateError<T> {
    /// Short description for diagnostics.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            GateError::Armed(_) => "gate already armed",
            GateError::Closed(_) => "receiving worker has exited",
        }
    }

    /// Recovers the refused value.
    pub fn into_inner(self) -> T {
        match self {
            GateError::Armed(value) | GateError::Closed(value) => value,
        }
    }
}

impl<T> fmt::Debug for GateError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// Signalling half of a gate.
pub struct GateSignal<T> {
    tx: mpsc::Sender<T>,
}

impl<T> GateSignal<T> {
    /// Arms the gate with `value`, waking the waiter if it is blocked.
    ///
    /// # Errors
    ///
    /// Returns `GateError::Armed` if a previous signal is still unconsumed
    /// and `GateError::Closed` if the waiter is gone.
    pub fn signal(&self, value: T) -> Result<(), GateError<T>> {
        self.tx.try_send(value).map_err(|err| match err {
            TrySendError::Full(value) => GateError::Armed(value),
            TrySendError::Closed(value) => GateError::Closed(value),
        })
    }
}

impl<T> Clone for GateSignal<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> fmt::Debug for GateSignal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateSignal")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

/// Waiting half of a gate.
pub struct GateWaiter<T> {
    rx: mpsc::Receiver<T>,
}

impl<T> GateWaiter<T> {
    /// Blocks until the gate is armed, then consumes the signal.
    ///
    /// Returns `None` once every signalling half is dropped and no signal is
    /// pending.
    pub async fn wait(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Consumes a pending signal without blocking.
    pub fn try_take(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }
}

impl<T> fmt::Debug for GateWaiter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateWaiter").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    #[tokio::test]
    async fn test_signal_before_wait_is_remembered() {
        // Arrange
        let (signal, mut waiter) = gate();

        // Act
        signal.signal(7).unwrap();

        // Assert
        assert_eq!(waiter.wait().await, Some(7));
    }

    #[tokio::test]
    async fn test_second_signal_while_armed_is_refused() {
        let (signal, mut waiter) = gate();

        signal.signal("first").unwrap();
        let refused = signal.signal("second").unwrap_err();

        assert!(matches!(refused, GateError::Armed("second")));
        assert_eq!(refused.into_inner(), "second");
        assert_eq!(waiter.try_take(), Some("first"));
    }

    #[tokio::test]
    async fn test_wait_consumes_so_gate_can_be_rearmed() {
        let (signal, mut waiter) = gate();

        signal.signal(1).unwrap();
        assert_eq!(waiter.wait().await, Some(1));
        signal.signal(2).unwrap();

        assert_eq!(waiter.wait().await, Some(2));
        assert_eq!(waiter.try_take(), None);
    }

    #[tokio::test]
    async fn test_wait_blocks_until_signalled() {
        // Arrange
        let (signal, mut waiter) = gate::<u8>();

        // Act
        let early = timeout(Duration::from_millis(20), waiter.wait()).await;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            signal.signal(9).unwrap();
        });
        let late = timeout(Duration::from_secs(5), waiter.wait()).await;
        handle.await.unwrap();

        // Assert
        assert!(early.is_err());
        assert_eq!(late.unwrap(), Some(9));
    }

    #[tokio::test]
    async fn test_signal_after_waiter_dropped_is_refused() {
        let (signal, waiter) = gate();
        drop(waiter);

        let refused = signal.signal(3).unwrap_err();

        assert!(matches!(refused, GateError::Closed(3)));
        assert_eq!(refused.reason(), "receiving worker has exited");
    }

    #[tokio::test]
    async fn test_wait_returns_none_when_all_signals_dropped() {
        let (signal, mut waiter) = gate::<u8>();
        drop(signal);

        assert_eq!(waiter.wait().await, None);
    }
}

//! Output sink abstraction.
//!
//! Replay hands the sink from worker to worker along with the right to emit,
//! so implementations never see two calls in flight and need no locking of
//! their own.

use std::io::{self, Write};

use crate::line::SEPARATOR;
use crate::speaker::Speaker;

/// Destination for replayed lines.
pub trait LineSink: Send + 'static {
    /// Writes one `speaker: text` line, newline-terminated.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the write fails.
    fn write_line(&mut self, speaker: &Speaker, text: &str) -> io::Result<()>;

    /// Flushes anything buffered.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the flush fails.
    fn flush(&mut self) -> io::Result<()>;
}

/// Sink that formats lines onto any `io::Write`.
#[derive(Debug)]
pub struct WriterSink<W> {
    inner: W,
}

impl<W: Write + Send + 'static> WriterSink<W> {
    /// Wraps a writer.
    #[must_use]
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write + Send + 'static> LineSink for WriterSink<W> {
    fn write_line(&mut self, speaker: &Speaker, text: &str) -> io::Result<()> {
        writeln!(self.inner, "{speaker}{SEPARATOR}{text}")
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

//! Test sinks — mock `LineSink` implementations for tests.

use std::io;

use scene_core::line::SEPARATOR;
use scene_core::sink::LineSink;
use scene_core::speaker::Speaker;

/// A sink that records every line it receives and whether it was flushed.
#[derive(Debug, Default)]
pub struct RecordingSink {
    lines: Vec<String>,
    flushes: usize,
}

impl RecordingSink {
    /// Create an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines written so far, without trailing newlines.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// All output as it would appear on a stream.
    #[must_use]
    pub fn output(&self) -> String {
        self.lines.iter().map(|line| format!("{line}\n")).collect()
    }

    /// Number of `flush` calls received.
    #[must_use]
    pub fn flushes(&self) -> usize {
        self.flushes
    }
}

impl LineSink for RecordingSink {
    fn write_line(&mut self, speaker: &Speaker, text: &str) -> io::Result<()> {
        self.lines.push(format!("{speaker}{SEPARATOR}{text}"));
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

/// A sink that fails the write with the given zero-based index, or every
/// flush. Counts attempted writes so tests can see that writing stopped.
#[derive(Debug)]
pub struct FailingSink {
    fail_write_at: Option<usize>,
    fail_flush: bool,
    attempts: usize,
    lines: Vec<String>,
}

impl FailingSink {
    /// Fails the `index`-th write (zero-based) with `BrokenPipe`.
    #[must_use]
    pub fn failing_write_at(index: usize) -> Self {
        Self {
            fail_write_at: Some(index),
            fail_flush: false,
            attempts: 0,
            lines: Vec::new(),
        }
    }

    /// Accepts every write but fails on flush.
    #[must_use]
    pub fn failing_flush() -> Self {
        Self {
            fail_write_at: None,
            fail_flush: true,
            attempts: 0,
            lines: Vec::new(),
        }
    }

    /// Number of `write_line` calls received, including the failing one.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Lines successfully written.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl LineSink for FailingSink {
    fn write_line(&mut self, speaker: &Speaker, text: &str) -> io::Result<()> {
        let index = self.attempts;
        self.attempts += 1;
        if self.fail_write_at == Some(index) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"));
        }
        self.lines.push(format!("{speaker}{SEPARATOR}{text}"));
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.fail_flush {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"));
        }
        Ok(())
    }
}

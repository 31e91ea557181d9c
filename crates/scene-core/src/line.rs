//! A single parsed script line.

use std::fmt;

use crate::speaker::Speaker;

/// Separator between speaker and text in a script line.
pub const SEPARATOR: &str = ": ";

/// One `speaker: text` line of a script, already validated against a roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    /// Who speaks the line.
    pub speaker: Speaker,
    /// Everything after the first separator, verbatim.
    pub text: String,
}

impl ScriptLine {
    /// Creates a new script line.
    #[must_use]
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
        }
    }
}

impl fmt::Display for ScriptLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.speaker, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speaker::Roster;

    #[test]
    fn test_display_reconstructs_source_line() {
        let roster = Roster::default();
        let line = ScriptLine::new(roster.get("Ross").unwrap().clone(), "we were on a break: ok");

        assert_eq!(line.to_string(), "Ross: we were on a break: ok");
    }
}

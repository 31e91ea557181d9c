//! Scene replay — dialogue script parsing.
//!
//! Turns line-oriented `speaker: text` input into an ordered list of
//! [`ScriptLine`]s. Parsing is all-or-nothing: the first bad line aborts and
//! nothing is returned.

use std::io::BufRead;

use scene_core::error::SceneError;
use scene_core::line::{SEPARATOR, ScriptLine};
use scene_core::speaker::Roster;
use tracing::debug;

/// Parses a single line, numbered from 1.
///
/// # Errors
///
/// Returns `SceneError::MalformedLine` if the separator is missing and
/// `SceneError::UnknownSpeaker` if the speaker is not on the roster.
pub fn parse_line(line: &str, line_number: usize, roster: &Roster) -> Result<ScriptLine, SceneError> {
    let Some((name, text)) = line.split_once(SEPARATOR) else {
        return Err(SceneError::MalformedLine {
            line_number,
            line: line.to_owned(),
        });
    };
    let speaker = roster
        .get(name)
        .ok_or_else(|| SceneError::UnknownSpeaker {
            line_number,
            speaker: name.to_owned(),
        })?;
    Ok(ScriptLine::new(speaker.clone(), text))
}

/// Parses a whole script held in memory.
///
/// # Errors
///
/// Returns the first line error encountered.
pub fn parse_script(input: &str, roster: &Roster) -> Result<Vec<ScriptLine>, SceneError> {
    let lines = input
        .lines()
        .enumerate()
        .map(|(idx, line)| parse_line(line, idx + 1, roster))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(lines = lines.len(), "parsed script");
    Ok(lines)
}

/// Reads and parses a script until end of input.
///
/// # Errors
///
/// Returns `SceneError::Io` if reading fails, otherwise the first line error.
pub fn read_script<R: BufRead>(reader: R, roster: &Roster) -> Result<Vec<ScriptLine>, SceneError> {
    let mut lines = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        lines.push(parse_line(&line, idx + 1, roster)?);
    }
    debug!(lines = lines.len(), "read script");
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use std::io::{self, BufReader, Read};

    use super::*;

    #[test]
    fn test_parse_script_keeps_order_and_text() {
        // Arrange
        let roster = Roster::default();
        let input = "Ross: hi\nRachel: hey\nRoss: bye";

        // Act
        let lines = parse_script(input, &roster).unwrap();

        // Assert
        let rendered: Vec<String> = lines.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, ["Ross: hi", "Rachel: hey", "Ross: bye"]);
        assert_eq!(lines[1].speaker.name(), "Rachel");
        assert_eq!(lines[1].text, "hey");
    }

    #[test]
    fn test_text_keeps_later_separators_and_spacing() {
        let roster = Roster::default();

        let line = parse_line("Joey: how you doin':  ok ", 1, &roster).unwrap();

        assert_eq!(line.speaker.name(), "Joey");
        assert_eq!(line.text, "how you doin':  ok ");
    }

    #[test]
    fn test_empty_input_yields_empty_script() {
        let roster = Roster::default();

        assert!(parse_script("", &roster).unwrap().is_empty());
    }

    #[test]
    fn test_line_without_separator_is_malformed() {
        let roster = Roster::default();
        let input = "Ross: hi\n12345\nRoss: bye";

        let err = parse_script(input, &roster).unwrap_err();

        match err {
            SceneError::MalformedLine { line_number, line } => {
                assert_eq!(line_number, 2);
                assert_eq!(line, "12345");
            }
            other => panic!("expected MalformedLine, got {other:?}"),
        }
    }

    #[test]
    fn test_colon_without_space_is_malformed() {
        let roster = Roster::default();

        let err = parse_line("Chandler:could I BE any more", 7, &roster).unwrap_err();

        assert!(matches!(err, SceneError::MalformedLine { line_number: 7, .. }));
    }

    #[test]
    fn test_blank_line_is_malformed() {
        let roster = Roster::default();

        let err = parse_script("Ross: hi\n\nRoss: bye", &roster).unwrap_err();

        assert!(matches!(err, SceneError::MalformedLine { line_number: 2, .. }));
    }

    #[test]
    fn test_unknown_speaker_is_rejected() {
        let roster = Roster::default();

        let err = parse_script("Ross: hi\nElon: to mars", &roster).unwrap_err();

        match err {
            SceneError::UnknownSpeaker {
                line_number,
                speaker,
            } => {
                assert_eq!(line_number, 2);
                assert_eq!(speaker, "Elon");
            }
            other => panic!("expected UnknownSpeaker, got {other:?}"),
        }
    }

    #[test]
    fn test_custom_roster_is_honored() {
        let roster = Roster::new(["Vladimir", "Estragon"]).unwrap();

        assert!(parse_script("Estragon: nothing to be done", &roster).is_ok());
        assert!(matches!(
            parse_script("Ross: hi", &roster),
            Err(SceneError::UnknownSpeaker { .. })
        ));
    }

    #[test]
    fn test_read_script_accepts_crlf() {
        let roster = Roster::default();
        let reader = BufReader::new("Monica: clean\r\nPhoebe: smelly cat\r\n".as_bytes());

        let lines = read_script(reader, &roster).unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "clean");
        assert_eq!(lines[1].text, "smelly cat");
    }

    struct BrokenReader;

    impl Read for BrokenReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "pipe closed"))
        }
    }

    #[test]
    fn test_read_script_propagates_io_errors() {
        let roster = Roster::default();

        let err = read_script(BufReader::new(BrokenReader), &roster).unwrap_err();

        assert!(matches!(err, SceneError::Io(_)));
    }
}

//! Speakers and the closed roster they are drawn from.

use std::fmt;
use std::sync::Arc;

use crate::error::SceneError;

/// Names used when no roster is configured.
pub const DEFAULT_SPEAKERS: [&str; 6] = ["Chandler", "Joey", "Monica", "Phoebe", "Rachel", "Ross"];

/// An immutable speaker identity. Cloning is cheap.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Speaker(Arc<str>);

impl Speaker {
    /// Returns the speaker's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Speaker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The closed set of speakers a script may use, fixed for the whole run.
///
/// Iteration follows the order the names were supplied in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    speakers: Vec<Speaker>,
}

impl Roster {
    /// Builds a roster from a list of names.
    ///
    /// # Errors
    ///
    /// Returns `SceneError::InvalidRoster` if the list is empty, a name is
    /// empty, contains `:`, has surrounding whitespace, or appears twice.
    pub fn new<I, S>(names: I) -> Result<Self, SceneError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut speakers: Vec<Speaker> = Vec::new();
        for name in names {
            let name = name.as_ref();
            if name.is_empty() {
                return Err(SceneError::InvalidRoster("speaker name is empty".to_owned()));
            }
            if name.contains(':') {
                return Err(SceneError::InvalidRoster(format!(
                    "speaker name {name:?} contains ':'"
                )));
            }
            if name.trim() != name {
                return Err(SceneError::InvalidRoster(format!(
                    "speaker name {name:?} has surrounding whitespace"
                )));
            }
            if speakers.iter().any(|s| s.name() == name) {
                return Err(SceneError::InvalidRoster(format!(
                    "speaker {name:?} listed twice"
                )));
            }
            speakers.push(Speaker(Arc::from(name)));
        }
        if speakers.is_empty() {
            return Err(SceneError::InvalidRoster("no speakers given".to_owned()));
        }
        Ok(Self { speakers })
    }

    /// Looks up a speaker by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Speaker> {
        self.speakers.iter().find(|s| s.name() == name)
    }

    /// Returns `true` if `name` belongs to the roster.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates the speakers in roster order.
    pub fn iter(&self) -> std::slice::Iter<'_, Speaker> {
        self.speakers.iter()
    }

    /// Number of speakers in the roster.
    #[must_use]
    pub fn len(&self) -> usize {
        self.speakers.len()
    }

    /// Always `false`; a roster cannot be built empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.speakers.is_empty()
    }
}

impl Default for Roster {
    fn default() -> Self {
        Self {
            speakers: DEFAULT_SPEAKERS
                .iter()
                .map(|name| Speaker(Arc::from(*name)))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a Speaker;
    type IntoIter = std::slice::Iter<'a, Speaker>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_roster_has_six_speakers_in_order() {
        let roster = Roster::default();

        let names: Vec<&str> = roster.iter().map(Speaker::name).collect();
        assert_eq!(names, DEFAULT_SPEAKERS);
    }

    #[test]
    fn test_new_roster_preserves_supplied_order() {
        // Arrange
        let names = ["Zed", "Amy", "Kif"];

        // Act
        let roster = Roster::new(names).unwrap();

        // Assert
        let got: Vec<String> = roster.iter().map(ToString::to_string).collect();
        assert_eq!(got, ["Zed", "Amy", "Kif"]);
        assert_eq!(roster.len(), 3);
    }

    #[test]
    fn test_get_returns_shared_speaker() {
        let roster = Roster::default();

        let ross = roster.get("Ross").unwrap();

        assert_eq!(ross.name(), "Ross");
        assert_eq!(ross, roster.get("Ross").unwrap());
        assert!(roster.get("Elon").is_none());
        assert!(roster.contains("Phoebe"));
        assert!(!roster.contains("phoebe"));
    }

    #[test]
    fn test_new_rejects_empty_roster() {
        let result = Roster::new(Vec::<String>::new());

        assert!(matches!(result, Err(SceneError::InvalidRoster(_))));
    }

    #[test]
    fn test_new_rejects_bad_names() {
        for bad in [vec![""], vec!["Ro:ss"], vec![" Ross"], vec!["Ross", "Ross"]] {
            let result = Roster::new(&bad);
            assert!(
                matches!(result, Err(SceneError::InvalidRoster(_))),
                "expected {bad:?} to be rejected"
            );
        }
    }
}

//! Turn index: each speaker's turns, linked by who speaks next.

use std::collections::HashMap;

use scene_core::line::ScriptLine;
use scene_core::speaker::{Roster, Speaker};

use crate::error::ChainDefect;

/// One utterance, owned by a single speaker, at a single global position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    position: usize,
    text: String,
    successor: Option<Speaker>,
}

impl Turn {
    /// Creates a turn.
    #[must_use]
    pub fn new(position: usize, text: impl Into<String>, successor: Option<Speaker>) -> Self {
        Self {
            position,
            text: text.into(),
            successor,
        }
    }

    /// Zero-based position of this turn in the script.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// The utterance.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Speaker of the next turn in the script, `None` for the last turn.
    #[must_use]
    pub fn successor(&self) -> Option<&Speaker> {
        self.successor.as_ref()
    }
}

/// Per-speaker turn lists for a whole script, plus who speaks first.
///
/// Every roster speaker has a list, possibly empty. Lists keep the order in
/// which the speaker's lines appear in the script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnIndex {
    speakers: Vec<(Speaker, Vec<Turn>)>,
    first_speaker: Option<Speaker>,
    total: usize,
}

impl TurnIndex {
    /// Indexes a parsed script.
    ///
    /// Turn `i` records the speaker of line `i + 1` as its successor; the
    /// last turn has none. A line whose speaker is missing from `roster`
    /// gets a list of its own after the roster speakers.
    #[must_use]
    pub fn build(roster: &Roster, lines: &[ScriptLine]) -> Self {
        let mut speakers: Vec<(Speaker, Vec<Turn>)> =
            roster.iter().map(|s| (s.clone(), Vec::new())).collect();
        let mut slots: HashMap<Speaker, usize> = speakers
            .iter()
            .enumerate()
            .map(|(slot, (speaker, _))| (speaker.clone(), slot))
            .collect();

        for (position, line) in lines.iter().enumerate() {
            let successor = lines.get(position + 1).map(|next| next.speaker.clone());
            let slot = *slots.entry(line.speaker.clone()).or_insert_with(|| {
                speakers.push((line.speaker.clone(), Vec::new()));
                speakers.len() - 1
            });
            speakers[slot]
                .1
                .push(Turn::new(position, line.text.clone(), successor));
        }

        Self {
            speakers,
            first_speaker: lines.first().map(|line| line.speaker.clone()),
            total: lines.len(),
        }
    }

    /// Assembles an index from prebuilt lists without checking them.
    #[must_use]
    pub fn from_parts(speakers: Vec<(Speaker, Vec<Turn>)>, first_speaker: Option<Speaker>) -> Self {
        let total = speakers.iter().map(|(_, turns)| turns.len()).sum();
        Self {
            speakers,
            first_speaker,
            total,
        }
    }

    /// Speaker of the first line, `None` for an empty script.
    #[must_use]
    pub fn first_speaker(&self) -> Option<&Speaker> {
        self.first_speaker.as_ref()
    }

    /// Turns belonging to `speaker`, empty if the speaker never talks.
    #[must_use]
    pub fn turns_for(&self, speaker: &Speaker) -> &[Turn] {
        self.speakers
            .iter()
            .find(|(s, _)| s == speaker)
            .map(|(_, turns)| turns.as_slice())
            .unwrap_or_default()
    }

    /// Speakers with a turn list, roster order first.
    pub fn speakers(&self) -> impl Iterator<Item = &Speaker> {
        self.speakers.iter().map(|(speaker, _)| speaker)
    }

    /// Total number of turns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.total
    }

    /// `true` for an empty script.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Walks the successor chain from the first speaker, consuming each
    /// speaker's turns in order, and checks that every step lands on the next
    /// turn in global order and that the walk covers every turn.
    ///
    /// # Errors
    ///
    /// Returns the first `ChainDefect` found.
    pub fn check_chain(&self) -> Result<(), ChainDefect> {
        let mut heads = vec![0_usize; self.speakers.len()];
        let mut current = self.first_speaker.as_ref();
        let mut expected = 0_usize;

        while let Some(speaker) = current {
            let Some(slot) = self.speakers.iter().position(|(s, _)| s == speaker) else {
                return Err(ChainDefect::UnknownSuccessor {
                    position: expected,
                    speaker: speaker.clone(),
                });
            };
            let Some(turn) = self.speakers[slot].1.get(heads[slot]) else {
                return Err(ChainDefect::MissingTurn {
                    position: expected,
                    speaker: speaker.clone(),
                });
            };
            if turn.position != expected {
                return Err(ChainDefect::OutOfOrder {
                    speaker: speaker.clone(),
                    expected,
                    found: turn.position,
                });
            }
            heads[slot] += 1;
            expected += 1;
            current = turn.successor.as_ref();
        }

        if expected == self.total {
            Ok(())
        } else {
            Err(ChainDefect::Unreached {
                reached: expected,
                total: self.total,
            })
        }
    }

    pub(crate) fn into_parts(self) -> (Vec<(Speaker, Vec<Turn>)>, Option<Speaker>) {
        (self.speakers, self.first_speaker)
    }
}

//! Debate transcript types.

use serde::{Deserialize, Serialize};

use crate::debate_format::{ROUNDS, RoundKind, Speaker};

/// One participant's statement in one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub round_ordinal: usize,
    pub speaker: Speaker,
    /// Generator output, stored verbatim (failure text included).
    pub text: String,
}

/// Both statements of a completed round, in speaking order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub kind: RoundKind,
    pub first: TurnRecord,
    pub second: TurnRecord,
}

impl RoundResult {
    pub fn first_speaker(&self) -> Speaker {
        self.first.speaker
    }

    pub fn second_speaker(&self) -> Speaker {
        self.second.speaker
    }

    /// The turn the given participant took in this round.
    pub fn turn_of(&self, speaker: Speaker) -> &TurnRecord {
        if self.first.speaker == speaker {
            &self.first
        } else {
            &self.second
        }
    }
}

/// The ordered record of a debate.
///
/// Rounds can only be appended; nothing already recorded is ever changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebateHistory {
    topic: String,
    leader: Speaker,
    rounds: Vec<RoundResult>,
}

impl DebateHistory {
    pub(crate) fn new(topic: impl Into<String>, leader: Speaker) -> Self {
        Self {
            topic: topic.into(),
            leader,
            rounds: Vec::with_capacity(ROUNDS.len()),
        }
    }

    pub(crate) fn push(&mut self, round: RoundResult) {
        debug_assert_eq!(round.kind.ordinal(), self.rounds.len());
        self.rounds.push(round);
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn leader(&self) -> Speaker {
        self.leader
    }

    pub fn rounds(&self) -> &[RoundResult] {
        &self.rounds
    }

    /// True once every round of the format has been recorded.
    pub fn is_complete(&self) -> bool {
        self.rounds.len() == ROUNDS.len()
    }

    /// All turns in speaking order.
    pub fn turns(&self) -> impl Iterator<Item = &TurnRecord> {
        self.rounds.iter().flat_map(|r| [&r.first, &r.second])
    }
}

//! Fixed three-round debate format.
//!
//! Every debate runs the same rounds in the same order: an opening
//! statement, a pushback round, and a closing reflection. Speaking order
//! alternates by round so the leader does not frame every exchange.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DebateError;

/// Kind of a debate round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundKind {
    Opening,
    Rebuttal,
    Closing,
}

impl RoundKind {
    /// Key used for this round in template files and config tables.
    pub fn key(&self) -> &'static str {
        match self {
            RoundKind::Opening => "opening",
            RoundKind::Rebuttal => "rebuttal",
            RoundKind::Closing => "closing",
        }
    }

    /// The fixed descriptor for this round kind.
    pub fn descriptor(&self) -> &'static RoundDescriptor {
        &ROUNDS[self.ordinal()]
    }

    pub fn ordinal(&self) -> usize {
        match self {
            RoundKind::Opening => 0,
            RoundKind::Rebuttal => 1,
            RoundKind::Closing => 2,
        }
    }
}

impl fmt::Display for RoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for RoundKind {
    type Err = DebateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "opening" => Ok(RoundKind::Opening),
            "rebuttal" => Ok(RoundKind::Rebuttal),
            "closing" => Ok(RoundKind::Closing),
            other => Err(DebateError::NotFound {
                kind: "round kind",
                id: other.to_string(),
            }),
        }
    }
}

/// A round within the debate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundDescriptor {
    pub kind: RoundKind,
    /// Zero-based position in the debate.
    pub ordinal: usize,
    /// Title announced to the audience.
    pub title: &'static str,
    /// What each participant is asked to do in this round.
    pub instruction: &'static str,
}

/// The rounds of every debate, in speaking order.
pub static ROUNDS: [RoundDescriptor; 3] = [
    RoundDescriptor {
        kind: RoundKind::Opening,
        ordinal: 0,
        title: "Opening Statement",
        instruction: "Present your opening perspective on this topic.",
    },
    RoundDescriptor {
        kind: RoundKind::Rebuttal,
        ordinal: 1,
        title: "Pushback / Attack",
        instruction: "Challenge the opposing view and defend your position.",
    },
    RoundDescriptor {
        kind: RoundKind::Closing,
        ordinal: 2,
        title: "Clarify & Reflect",
        instruction: "Reflect on the discussion and clarify your final position.",
    },
];

/// One of the two debate seats. The leader is also expressed as a `Speaker`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Speaker {
    A,
    B,
}

impl Speaker {
    pub fn opponent(&self) -> Speaker {
        match self {
            Speaker::A => Speaker::B,
            Speaker::B => Speaker::A,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Speaker::A => "Fighter A",
            Speaker::B => "Fighter B",
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::A => f.write_str("A"),
            Speaker::B => f.write_str("B"),
        }
    }
}

impl FromStr for Speaker {
    type Err = DebateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(Speaker::A),
            "B" | "b" => Ok(Speaker::B),
            other => Err(DebateError::ConfigError(format!(
                "Leader must be 'A' or 'B', got '{}'",
                other
            ))),
        }
    }
}

/// Who opens the given round.
///
/// The leader speaks first on even ordinals and second on odd ones.
pub fn first_speaker(leader: Speaker, ordinal: usize) -> Speaker {
    if ordinal % 2 == 0 {
        leader
    } else {
        leader.opponent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounds_are_ordered_and_unique() {
        assert_eq!(ROUNDS.len(), 3);
        for (i, round) in ROUNDS.iter().enumerate() {
            assert_eq!(round.ordinal, i);
            assert_eq!(round.kind.ordinal(), i);
        }
        assert_eq!(ROUNDS[0].kind, RoundKind::Opening);
        assert_eq!(ROUNDS[1].kind, RoundKind::Rebuttal);
        assert_eq!(ROUNDS[2].kind, RoundKind::Closing);
    }

    #[test]
    fn test_round_titles() {
        assert_eq!(RoundKind::Opening.descriptor().title, "Opening Statement");
        assert_eq!(RoundKind::Rebuttal.descriptor().title, "Pushback / Attack");
        assert_eq!(RoundKind::Closing.descriptor().title, "Clarify & Reflect");
    }

    #[test]
    fn test_alternating_speakers_leader_a() {
        assert_eq!(first_speaker(Speaker::A, 0), Speaker::A);
        assert_eq!(first_speaker(Speaker::A, 1), Speaker::B);
        assert_eq!(first_speaker(Speaker::A, 2), Speaker::A);
    }

    #[test]
    fn test_alternating_speakers_leader_b() {
        assert_eq!(first_speaker(Speaker::B, 0), Speaker::B);
        assert_eq!(first_speaker(Speaker::B, 1), Speaker::A);
        assert_eq!(first_speaker(Speaker::B, 2), Speaker::B);
    }

    #[test]
    fn test_parse_round_kind() {
        assert_eq!("Rebuttal".parse::<RoundKind>().unwrap(), RoundKind::Rebuttal);
        assert!(matches!(
            "crossfire".parse::<RoundKind>(),
            Err(DebateError::NotFound { .. })
        ));
    }

    #[test]
    fn test_parse_speaker() {
        assert_eq!("a".parse::<Speaker>().unwrap(), Speaker::A);
        assert_eq!(" B ".parse::<Speaker>().unwrap(), Speaker::B);
        assert!(matches!(
            "C".parse::<Speaker>(),
            Err(DebateError::ConfigError(_))
        ));
    }
}

//! Post-debate analysis.

use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::debate_format::Speaker;
use crate::error::DebateError;
use crate::generator::{GenerationRequest, SUMMARY_FAILURE, TextGenerator};
use crate::transcript::DebateHistory;

/// Neutral directive for the analyst; never either debater's voice.
pub const ANALYST_DIRECTIVE: &str = "You are a neutral debate analyst with expertise in philosophy, \
rhetoric, and psychology. Provide an objective analysis of how each debater's thinking evolved, \
highlighting the clash of philosophies and rhetorical strategies without taking sides.";

#[derive(Serialize)]
struct SummaryView<'a> {
    topic: &'a str,
    fighter_a: &'a str,
    fighter_b: &'a str,
    leader: &'a str,
    rounds: Vec<RoundView<'a>>,
}

#[derive(Serialize)]
struct RoundView<'a> {
    round_name: &'a str,
    first_speaker: &'a str,
    fighter_a_response: &'a str,
    fighter_b_response: &'a str,
}

/// Build the analysis prompt for a finished debate.
pub fn build_summary_prompt(
    history: &DebateHistory,
    name_a: &str,
    name_b: &str,
) -> Result<String, DebateError> {
    let name_of = |speaker: Speaker| match speaker {
        Speaker::A => name_a,
        Speaker::B => name_b,
    };
    let leader_name = name_of(history.leader());

    let view = SummaryView {
        topic: history.topic(),
        fighter_a: name_a,
        fighter_b: name_b,
        leader: leader_name,
        rounds: history
            .rounds()
            .iter()
            .map(|round| RoundView {
                round_name: round.kind.descriptor().title,
                first_speaker: name_of(round.first_speaker()),
                fighter_a_response: &round.turn_of(Speaker::A).text,
                fighter_b_response: &round.turn_of(Speaker::B).text,
            })
            .collect(),
    };
    let rounds_json = serde_json::to_string_pretty(&view)?;

    Ok(format!(
        r#"Analyze this debate between {name_a} and {name_b} on the topic: {topic}

{rounds_json}

Don't use a generic template for your analysis. For each debater, identify:

1. Their starting position
2. How their thinking shifted during the debate
3. Points where they held firm
4. Why they shifted or maintained their positions

Then analyze how the opening framing influenced the direction of the debate. Note: {leader_name} led the debate and spoke first in the opening round.

FORMAT:
- Use a compelling title that captures the essence of the clash
- Provide clear, direct analysis of each point above
- End with a brief reflection on how these contrasting approaches represent different paths to handling the same challenge"#,
        topic = history.topic(),
    ))
}

/// Produces the closing analysis of a debate.
pub struct Summarizer {
    generator: Arc<dyn TextGenerator>,
    max_tokens: u32,
}

impl Summarizer {
    pub fn new(generator: Arc<dyn TextGenerator>, max_tokens: u32) -> Self {
        Self {
            generator,
            max_tokens,
        }
    }

    /// One generation call; returns [`SUMMARY_FAILURE`] if it cannot produce text.
    pub async fn summarize(&self, history: &DebateHistory, name_a: &str, name_b: &str) -> String {
        let prompt = match build_summary_prompt(history, name_a, name_b) {
            Ok(prompt) => prompt,
            Err(e) => {
                warn!(error = %e, "Could not build summary prompt");
                return SUMMARY_FAILURE.to_string();
            }
        };

        info!(rounds = history.rounds().len(), "Generating debate summary");
        self.generator
            .generate(GenerationRequest {
                directive: ANALYST_DIRECTIVE,
                prompt: &prompt,
                max_tokens: self.max_tokens,
                failure_text: SUMMARY_FAILURE,
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debate_format::{ROUNDS, first_speaker};
    use crate::generator::testing::{Reply, ScriptedGenerator};
    use crate::transcript::{RoundResult, TurnRecord};

    fn finished_history(leader: Speaker) -> DebateHistory {
        let mut history = DebateHistory::new("Is discipline more important than motivation?", leader);
        for round in &ROUNDS {
            let first = first_speaker(leader, round.ordinal);
            let turn = |speaker: Speaker| TurnRecord {
                round_ordinal: round.ordinal,
                speaker,
                text: format!("{} says round {}", speaker, round.ordinal),
            };
            history.push(RoundResult {
                kind: round.kind,
                first: turn(first),
                second: turn(first.opponent()),
            });
        }
        history
    }

    #[test]
    fn test_prompt_contains_every_turn_and_leader() {
        let history = finished_history(Speaker::B);
        let prompt = build_summary_prompt(&history, "David Goggins", "Mel Robbins").unwrap();

        for turn in history.turns() {
            assert!(prompt.contains(&turn.text), "missing {:?}", turn.text);
        }
        assert!(prompt.contains("Mel Robbins led the debate and spoke first in the opening round"));
        assert!(prompt.contains("Is discipline more important than motivation?"));
        assert!(prompt.contains("Pushback / Attack"));
        assert!(prompt.contains("\"first_speaker\": \"David Goggins\""));
    }

    #[test]
    fn test_prompt_labels_responses_by_fighter() {
        let history = finished_history(Speaker::A);
        let prompt = build_summary_prompt(&history, "Alpha", "Beta").unwrap();
        assert!(prompt.contains("\"fighter_a_response\": \"A says round 1\""));
        assert!(prompt.contains("\"fighter_b_response\": \"B says round 1\""));
    }

    #[tokio::test]
    async fn test_summarize_uses_analyst_directive() {
        let generator = Arc::new(ScriptedGenerator::with_replies([Reply::Text(
            "A fine debate.".to_string(),
        )]));
        let summarizer = Summarizer::new(generator.clone(), 1500);

        let summary = summarizer
            .summarize(&finished_history(Speaker::A), "Alpha", "Beta")
            .await;

        assert_eq!(summary, "A fine debate.");
        let calls = generator.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].directive, ANALYST_DIRECTIVE);
        assert_eq!(calls[0].max_tokens, 1500);
    }

    #[tokio::test]
    async fn test_summarize_failure_returns_sentinel() {
        let generator = Arc::new(ScriptedGenerator::with_replies([Reply::Fail]));
        let summarizer = Summarizer::new(generator.clone(), 1500);

        let summary = summarizer
            .summarize(&finished_history(Speaker::A), "Alpha", "Beta")
            .await;

        assert_eq!(summary, SUMMARY_FAILURE);
        assert_eq!(generator.calls().len(), 1);
    }
}

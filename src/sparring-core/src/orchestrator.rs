//! Debate orchestration logic.
//!
//! Runs the three rounds, decides who speaks first in each, builds every
//! prompt from the round template plus the history so far, and hands the
//! finished transcript to the summarizer.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::debate_format::{ROUNDS, RoundDescriptor, Speaker, first_speaker};
use crate::error::DebateError;
use crate::generator::{GenerationRequest, TURN_FAILURE, TextGenerator};
use crate::personality::{Personality, PersonalityStore, normalize_id};
use crate::summarizer::Summarizer;
use crate::template::{self, TemplateStore};
use crate::transcript::{DebateHistory, RoundResult, TurnRecord};

/// Tunables for a debate run.
#[derive(Debug, Clone)]
pub struct DebateSettings {
    /// Token limit for each debater turn.
    pub turn_max_tokens: u32,
    /// Token limit for the closing analysis.
    pub summary_max_tokens: u32,
    /// Pause between rounds, for console pacing only.
    pub round_delay: Duration,
}

impl Default for DebateSettings {
    fn default() -> Self {
        Self {
            turn_max_tokens: 1000,
            summary_max_tokens: 1500,
            round_delay: Duration::ZERO,
        }
    }
}

/// Who is debating what.
#[derive(Debug, Clone)]
pub struct DebateRequest {
    pub topic: String,
    /// Personality id for fighter A.
    pub personality_a: String,
    /// Personality id for fighter B.
    pub personality_b: String,
    pub leader: Speaker,
}

/// Everything a finished debate produced.
#[derive(Debug, Clone)]
pub struct DebateOutcome {
    pub fighter_a: Personality,
    pub fighter_b: Personality,
    pub history: DebateHistory,
    pub summary: String,
}

/// Callback for debate events.
pub type DebateCallback = Box<dyn Fn(DebateEvent) + Send + Sync>;

/// Events emitted during a debate.
#[derive(Debug, Clone)]
pub enum DebateEvent {
    /// Both fighters resolved; the first round is about to start.
    DebateStart {
        fighter_a: String,
        fighter_b: String,
        leader: String,
    },
    /// A new round is starting.
    RoundStart {
        number: usize,
        title: String,
        instruction: String,
    },
    /// A participant is about to speak.
    SpeakerStart { name: String, speaker: Speaker },
    /// A participant has finished speaking.
    SpeakerMessage { name: String, content: String },
    /// The pacing pause between two rounds.
    RoundBreak { delay: Duration },
    /// All rounds are done and the analysis is being generated.
    SummaryStart,
    /// The debate has concluded.
    DebateEnd { summary: String },
}

/// The two resolved fighters of one run.
struct Fighters<'a> {
    a: &'a Personality,
    b: &'a Personality,
}

impl Fighters<'_> {
    fn get(&self, speaker: Speaker) -> &Personality {
        match speaker {
            Speaker::A => self.a,
            Speaker::B => self.b,
        }
    }
}

/// Orchestrates a debate between two personalities.
pub struct DebateOrchestrator {
    generator: Arc<dyn TextGenerator>,
    personalities: PersonalityStore,
    templates: TemplateStore,
    settings: DebateSettings,
    summarizer: Summarizer,
    /// Event callback.
    callback: Option<DebateCallback>,
}

impl DebateOrchestrator {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        personalities: PersonalityStore,
        templates: TemplateStore,
        settings: DebateSettings,
    ) -> Self {
        let summarizer = Summarizer::new(generator.clone(), settings.summary_max_tokens);
        Self {
            generator,
            personalities,
            templates,
            settings,
            summarizer,
            callback: None,
        }
    }

    /// Set a callback for debate events.
    pub fn with_callback(mut self, callback: DebateCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Run all three rounds and the summary.
    ///
    /// Selection and lookup errors are returned before any generation call
    /// is made. Generation failures never abort the run: the failure text
    /// is recorded as the turn and shown to the opponent like any statement.
    pub async fn run_debate(&self, request: &DebateRequest) -> Result<DebateOutcome, DebateError> {
        if normalize_id(&request.personality_a) == normalize_id(&request.personality_b) {
            return Err(DebateError::ConfigError(format!(
                "Fighter A and Fighter B must be different personalities (both are '{}')",
                normalize_id(&request.personality_a)
            )));
        }

        let fighters = Fighters {
            a: self.personalities.resolve(&request.personality_a)?,
            b: self.personalities.resolve(&request.personality_b)?,
        };
        let templates = ROUNDS
            .iter()
            .map(|round| self.templates.resolve(round.kind))
            .collect::<Result<Vec<_>, _>>()?;

        if request.topic.trim().is_empty() {
            warn!("Debate topic is empty");
        }

        info!(
            fighter_a = %fighters.a.name,
            fighter_b = %fighters.b.name,
            leader = %request.leader,
            "Starting debate"
        );
        self.emit_event(DebateEvent::DebateStart {
            fighter_a: fighters.a.name.clone(),
            fighter_b: fighters.b.name.clone(),
            leader: fighters.get(request.leader).name.clone(),
        });

        let mut history = DebateHistory::new(&request.topic, request.leader);

        for (round, template) in ROUNDS.iter().zip(templates) {
            if round.ordinal > 0 && !self.settings.round_delay.is_zero() {
                self.emit_event(DebateEvent::RoundBreak {
                    delay: self.settings.round_delay,
                });
                tokio::time::sleep(self.settings.round_delay).await;
            }

            let result = self
                .run_round(round, template, &fighters, &history)
                .await;
            history.push(result);
            info!(round = %round.kind, "Completed round");
        }

        self.emit_event(DebateEvent::SummaryStart);
        let summary = self
            .summarizer
            .summarize(&history, &fighters.a.name, &fighters.b.name)
            .await;
        self.emit_event(DebateEvent::DebateEnd {
            summary: summary.clone(),
        });

        Ok(DebateOutcome {
            fighter_a: fighters.a.clone(),
            fighter_b: fighters.b.clone(),
            history,
            summary,
        })
    }

    async fn run_round(
        &self,
        round: &RoundDescriptor,
        template: &str,
        fighters: &Fighters<'_>,
        history: &DebateHistory,
    ) -> RoundResult {
        self.emit_event(DebateEvent::RoundStart {
            number: round.ordinal + 1,
            title: round.title.to_string(),
            instruction: round.instruction.to_string(),
        });

        let opener = first_speaker(history.leader(), round.ordinal);
        let first = self
            .take_turn(round, template, opener, fighters, history, None)
            .await;
        let second = self
            .take_turn(
                round,
                template,
                opener.opponent(),
                fighters,
                history,
                Some(&first.text),
            )
            .await;

        RoundResult {
            kind: round.kind,
            first,
            second,
        }
    }

    /// One participant's turn. `opponent_latest` is set only for the second speaker.
    async fn take_turn(
        &self,
        round: &RoundDescriptor,
        template: &str,
        speaker: Speaker,
        fighters: &Fighters<'_>,
        history: &DebateHistory,
        opponent_latest: Option<&str>,
    ) -> TurnRecord {
        let personality = fighters.get(speaker);
        let prompt = build_turn_prompt(
            template,
            history.topic(),
            history.rounds(),
            speaker,
            opponent_latest,
        );

        self.emit_event(DebateEvent::SpeakerStart {
            name: personality.name.clone(),
            speaker,
        });
        debug!(
            round = %round.kind,
            speaker = %speaker,
            prompt_len = prompt.len(),
            "Requesting turn"
        );

        let text = self
            .generator
            .generate(GenerationRequest {
                directive: &personality.behavior_directive,
                prompt: &prompt,
                max_tokens: self.settings.turn_max_tokens,
                failure_text: TURN_FAILURE,
            })
            .await;

        self.emit_event(DebateEvent::SpeakerMessage {
            name: personality.name.clone(),
            content: text.clone(),
        });

        TurnRecord {
            round_ordinal: round.ordinal,
            speaker,
            text,
        }
    }

    /// Emit an event if a callback is registered.
    fn emit_event(&self, event: DebateEvent) {
        if let Some(ref callback) = self.callback {
            callback(event);
        }
    }
}

/// Build the prompt for `speaker`'s turn.
///
/// `previous` holds every completed round so far; the second speaker of the
/// current round also gets the first speaker's statement via `opponent_latest`.
pub fn build_turn_prompt(
    template: &str,
    topic: &str,
    previous: &[RoundResult],
    speaker: Speaker,
    opponent_latest: Option<&str>,
) -> String {
    let previous_context = render_previous_context(previous, speaker);
    let opponent_response = opponent_latest
        .map(|text| format!("Your opponent just said:\n\n{}", text))
        .unwrap_or_default();
    template::render(template, topic, &previous_context, &opponent_response)
}

/// Earlier rounds from `speaker`'s point of view, oldest first.
fn render_previous_context(previous: &[RoundResult], speaker: Speaker) -> String {
    if previous.is_empty() {
        return String::new();
    }

    let mut context = String::from("Previous exchanges:\n\n");
    for round in previous {
        context.push_str(&format!("You: {}\n\n", round.turn_of(speaker).text));
        context.push_str(&format!(
            "Opponent: {}\n\n",
            round.turn_of(speaker.opponent()).text
        ));
    }
    context
}

//! Round prompt templates.
//!
//! A template is plain text with three placeholders:
//!
//! - `{TOPIC}`: the debate topic
//! - `{PREVIOUS_CONTEXT}`: earlier rounds seen from the speaker's side
//! - `{OPPONENT_RESPONSE}`: the opponent's statement in the current round
//!
//! Substitution happens in a single pass, so placeholder-looking text in a
//! topic or a generated statement is never expanded again.

use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::warn;

use crate::debate_format::{ROUNDS, RoundKind};
use crate::error::DebateError;

pub const TOPIC: &str = "{TOPIC}";
pub const PREVIOUS_CONTEXT: &str = "{PREVIOUS_CONTEXT}";
pub const OPPONENT_RESPONSE: &str = "{OPPONENT_RESPONSE}";

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{(TOPIC|PREVIOUS_CONTEXT|OPPONENT_RESPONSE)\}").expect("valid placeholder regex")
});

/// Immutable mapping from round kind to template text.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    templates: BTreeMap<RoundKind, String>,
}

impl TemplateStore {
    pub fn new(templates: BTreeMap<RoundKind, String>) -> Self {
        for (kind, text) in &templates {
            let missing = missing_placeholders(text);
            if !missing.is_empty() {
                warn!(round = %kind, missing = ?missing, "Template is missing placeholders");
            }
        }
        Self { templates }
    }

    /// One default template per round, built from the round's title and instruction.
    pub fn builtin() -> Self {
        let templates = ROUNDS
            .iter()
            .map(|round| {
                let text = format!(
                    "Topic: {TOPIC}\n\n\
                     Round: {title}\n\n\
                     Instruction: {instruction}\n\n\
                     {PREVIOUS_CONTEXT}{OPPONENT_RESPONSE}\n\n\
                     {instruction} Remember to stay completely in character.",
                    title = round.title,
                    instruction = round.instruction,
                );
                (round.kind, text)
            })
            .collect();
        Self { templates }
    }

    /// Replace templates using keys such as `"opening"` from a config table.
    pub fn with_overrides(
        mut self,
        overrides: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self, DebateError> {
        for (key, text) in overrides {
            let kind: RoundKind = key.parse().map_err(|_| {
                DebateError::ConfigError(format!(
                    "Unknown template '{}'; expected one of opening, rebuttal, closing",
                    key
                ))
            })?;
            let missing = missing_placeholders(&text);
            if !missing.is_empty() {
                return Err(DebateError::ConfigError(format!(
                    "Template '{}' is missing placeholders: {}",
                    kind,
                    missing.join(", ")
                )));
            }
            self.templates.insert(kind, text);
        }
        Ok(self)
    }

    pub fn resolve(&self, kind: RoundKind) -> Result<&str, DebateError> {
        self.templates
            .get(&kind)
            .map(String::as_str)
            .ok_or_else(|| DebateError::NotFound {
                kind: "template",
                id: kind.key().to_string(),
            })
    }
}

/// Fill a template's placeholders.
pub fn render(template: &str, topic: &str, previous_context: &str, opponent_response: &str) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match &caps[1] {
            "TOPIC" => topic.to_string(),
            "PREVIOUS_CONTEXT" => previous_context.to_string(),
            _ => opponent_response.to_string(),
        })
        .into_owned()
}

/// Placeholders that do not appear anywhere in `template`.
pub fn missing_placeholders(template: &str) -> Vec<&'static str> {
    [TOPIC, PREVIOUS_CONTEXT, OPPONENT_RESPONSE]
        .into_iter()
        .filter(|placeholder| !template.contains(placeholder))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_every_round() {
        let store = TemplateStore::builtin();
        for round in &ROUNDS {
            let text = store.resolve(round.kind).unwrap();
            assert!(text.contains(TOPIC));
            assert!(text.contains(PREVIOUS_CONTEXT));
            assert!(text.contains(OPPONENT_RESPONSE));
            assert!(text.contains(round.title));
        }
    }

    #[test]
    fn test_render_fills_placeholders() {
        let out = render(
            "T={TOPIC}|P={PREVIOUS_CONTEXT}|O={OPPONENT_RESPONSE}|T={TOPIC}",
            "grit",
            "before",
            "said",
        );
        assert_eq!(out, "T=grit|P=before|O=said|T=grit");
    }

    #[test]
    fn test_render_does_not_reexpand_inserted_text() {
        let out = render("{TOPIC} / {OPPONENT_RESPONSE}", "{OPPONENT_RESPONSE}", "", "x");
        assert_eq!(out, "{OPPONENT_RESPONSE} / x");
    }

    #[test]
    fn test_missing_template() {
        let store = TemplateStore::new(BTreeMap::from([(
            RoundKind::Opening,
            "{TOPIC}".to_string(),
        )]));
        assert!(store.resolve(RoundKind::Opening).is_ok());
        match store.resolve(RoundKind::Closing) {
            Err(DebateError::NotFound { kind, id }) => {
                assert_eq!(kind, "template");
                assert_eq!(id, "closing");
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_overrides() {
        let text = "Hit back on {TOPIC}.\n{PREVIOUS_CONTEXT}{OPPONENT_RESPONSE}";
        let store = TemplateStore::builtin()
            .with_overrides([("Rebuttal".to_string(), text.to_string())])
            .unwrap();
        assert_eq!(store.resolve(RoundKind::Rebuttal).unwrap(), text);
        assert!(store.resolve(RoundKind::Opening).unwrap().contains("Opening Statement"));
    }

    #[test]
    fn test_unknown_override_key() {
        let result = TemplateStore::builtin().with_overrides([(
            "crossfire".to_string(),
            "{TOPIC}{PREVIOUS_CONTEXT}{OPPONENT_RESPONSE}".to_string(),
        )]);
        assert!(matches!(result, Err(DebateError::ConfigError(_))));
    }

    #[test]
    fn test_override_missing_opponent_response_rejected() {
        let result = TemplateStore::builtin().with_overrides([(
            "opening".to_string(),
            "Talk about {TOPIC}. {PREVIOUS_CONTEXT}".to_string(),
        )]);
        match result {
            Err(DebateError::ConfigError(msg)) => {
                assert!(msg.contains("opening"));
                assert!(msg.contains(OPPONENT_RESPONSE));
                assert!(!msg.contains(PREVIOUS_CONTEXT));
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_override_missing_previous_context_rejected() {
        let result = TemplateStore::builtin().with_overrides([(
            "closing".to_string(),
            "Close {TOPIC}. {OPPONENT_RESPONSE}".to_string(),
        )]);
        assert!(matches!(result, Err(DebateError::ConfigError(_))));
    }

    #[test]
    fn test_missing_placeholders() {
        assert!(missing_placeholders("{TOPIC}{PREVIOUS_CONTEXT}{OPPONENT_RESPONSE}").is_empty());
        assert_eq!(
            missing_placeholders("{TOPIC}"),
            vec![PREVIOUS_CONTEXT, OPPONENT_RESPONSE]
        );
    }
}

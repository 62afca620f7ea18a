//! Text generation backends.
//!
//! The debate only ever asks for one thing: "given this directive and this
//! prompt, give me text". Failures never reach the caller; they are logged
//! and replaced with the request's failure text, which then flows through
//! the debate like any other statement.

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestUserMessage, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::DebateError;

/// Substituted for a debater's statement when generation fails.
pub const TURN_FAILURE: &str = "Error: Could not generate response.";

/// Substituted for the summary when generation fails.
pub const SUMMARY_FAILURE: &str = "Error: Could not generate debate summary.";

/// A single generation call.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    /// Behavior directive, sent as the system message.
    pub directive: &'a str,
    /// The user prompt.
    pub prompt: &'a str,
    pub max_tokens: u32,
    /// Returned verbatim if generation fails for any reason.
    pub failure_text: &'a str,
}

/// Produces text for a directive and prompt. Never fails at this level.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest<'_>) -> String;
}

/// Connection and sampling settings for [`OpenAiGenerator`].
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// OpenAI-compatible API base URL.
    pub api_base: String,
    /// API key for authentication.
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
    /// Strip `<think>`-style reasoning blocks from replies.
    pub strip_reasoning: bool,
}

impl GeneratorConfig {
    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            timeout: Duration::from_secs(120),
            strip_reasoning: true,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Generator backed by an OpenAI-compatible chat completions endpoint.
pub struct OpenAiGenerator {
    client: Client<OpenAIConfig>,
    config: GeneratorConfig,
}

impl OpenAiGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self, DebateError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                DebateError::ConfigError(format!("Failed to create HTTP client: {}", e))
            })?;

        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.api_key)
            .with_api_base(&config.api_base);

        let client = Client::with_config(openai_config).with_http_client(http_client);

        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    async fn try_generate(&self, request: GenerationRequest<'_>) -> Result<String, DebateError> {
        let messages = vec![
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                content: request.directive.to_string().into(),
                name: None,
            }),
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                content: request.prompt.to_string().into(),
                name: None,
            }),
        ];

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.config.model)
            .temperature(self.config.temperature)
            .max_completion_tokens(request.max_tokens)
            .messages(messages)
            .build()?;

        debug!(model = %self.config.model, max_tokens = request.max_tokens, "Sending chat completion request");
        let response = self.client.chat().create(chat_request).await?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone());

        finish_content(content, self.config.strip_reasoning)
    }
}

/// Turn raw reply content into a statement; missing or blank content is an error.
fn finish_content(content: Option<String>, strip: bool) -> Result<String, DebateError> {
    let content = content
        .ok_or_else(|| DebateError::GenerationError("response had no content".to_string()))?;
    let text = if strip {
        strip_reasoning(&content)
    } else {
        content
    };
    if text.trim().is_empty() {
        return Err(DebateError::GenerationError(
            "response content was empty".to_string(),
        ));
    }
    Ok(text)
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, request: GenerationRequest<'_>) -> String {
        match self.try_generate(request).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Generation failed, substituting failure text");
                request.failure_text.to_string()
            }
        }
    }
}

/// Reasoning blocks some models leak into their replies.
const REASONING_TAGS: [&str; 6] = [
    "thinking",
    "think",
    "reflection",
    "reasoning",
    "thought",
    "scratchpad",
];

static REASONING_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives: Vec<String> = REASONING_TAGS
        .iter()
        .map(|tag| format!(r"<{tag}\b[^>]*>.*?</{tag}\s*>"))
        .collect();
    Regex::new(&format!("(?is){}", alternatives.join("|"))).expect("valid reasoning regex")
});

static BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid whitespace regex"));

/// Remove reasoning blocks, keeping paragraph layout.
fn strip_reasoning(response: &str) -> String {
    let stripped = REASONING_BLOCK.replace_all(response, "");
    BLANK_RUNS.replace_all(&stripped, "\n\n").trim().to_string()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_reasoning_thinking_tags() {
        let input = "<thinking>Let me think about this...</thinking>The answer is 42.";
        assert_eq!(strip_reasoning(input), "The answer is 42.");
    }

    #[test]
    fn test_strip_reasoning_multiline_tags() {
        let input = "<think>\nMultiple\nlines\nof\nthought\n</think>\nFinal answer here.";
        assert_eq!(strip_reasoning(input), "Final answer here.");
    }

    #[test]
    fn test_strip_reasoning_keeps_paragraphs() {
        let input = "First point.\n\n<reflection>hmm</reflection>\n\nSecond point.";
        assert_eq!(strip_reasoning(input), "First point.\n\nSecond point.");
    }

    #[test]
    fn test_strip_reasoning_leaves_other_markup() {
        let input = "Stay <b>hard</b>.";
        assert_eq!(strip_reasoning(input), "Stay <b>hard</b>.");
    }

    #[test]
    fn test_finish_content_keeps_reply() {
        let text = finish_content(Some("<think>hm</think>Stay hard.".to_string()), true).unwrap();
        assert_eq!(text, "Stay hard.");
        let raw = finish_content(Some("<think>hm</think>Stay hard.".to_string()), false).unwrap();
        assert_eq!(raw, "<think>hm</think>Stay hard.");
    }

    #[test]
    fn test_finish_content_rejects_missing_or_blank() {
        for (content, strip) in [
            (None, true),
            (Some(String::new()), false),
            (Some("  \n\t ".to_string()), false),
            (Some("<think>only reasoning</think>".to_string()), true),
        ] {
            assert!(matches!(
                finish_content(content, strip),
                Err(DebateError::GenerationError(_))
            ));
        }
    }

    #[test]
    fn test_generator_config_defaults() {
        let config = GeneratorConfig::new("http://localhost:11434/v1", "").with_model("llama3:8b");
        assert_eq!(config.model, "llama3:8b");
        assert_eq!(config.temperature, 0.7);
        assert!(config.strip_reasoning);
    }

    #[test]
    fn test_openai_generator_builds() {
        let generator = OpenAiGenerator::new(GeneratorConfig::new("http://localhost:1/v1", "key"))
            .unwrap();
        assert_eq!(generator.model(), DEFAULT_MODEL);
    }

    #[tokio::test]
    async fn test_scripted_generator_failure_uses_request_text() {
        let generator = testing::ScriptedGenerator::with_replies([testing::Reply::Fail]);
        let out = generator
            .generate(GenerationRequest {
                directive: "d",
                prompt: "p",
                max_tokens: 10,
                failure_text: TURN_FAILURE,
            })
            .await;
        assert_eq!(out, TURN_FAILURE);
        assert_eq!(generator.calls().len(), 1);
    }
}

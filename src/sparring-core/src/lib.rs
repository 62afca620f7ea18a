//! Sparring Core Library
//!
//! Runs a three-round debate between two personality profiles over a text
//! generation backend, summarizes it, and exports the transcript.

pub mod config;
pub mod debate_format;
pub mod error;
pub mod export;
pub mod generator;
pub mod orchestrator;
pub mod personality;
pub mod summarizer;
pub mod template;
pub mod transcript;

pub use config::Config;
pub use debate_format::{ROUNDS, RoundDescriptor, RoundKind, Speaker, first_speaker};
pub use error::DebateError;
pub use export::{DebateMetadata, TextFileExporter, TranscriptExporter};
pub use generator::{
    GenerationRequest, GeneratorConfig, OpenAiGenerator, SUMMARY_FAILURE, TURN_FAILURE,
    TextGenerator,
};
pub use orchestrator::{
    DebateCallback, DebateEvent, DebateOrchestrator, DebateOutcome, DebateRequest, DebateSettings,
};
pub use personality::{Personality, PersonalityStore};
pub use summarizer::Summarizer;
pub use template::TemplateStore;
pub use transcript::{DebateHistory, RoundResult, TurnRecord};
